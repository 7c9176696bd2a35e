// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # PrivateLink Sync
//!
//! A declarative, idempotent reconciliation engine for AWS PrivateLink
//! VPC endpoint services.
//!
//! ## Overview
//!
//! The crate keeps live cloud infrastructure continuously converged with a
//! desired-state description:
//!
//! 1. **Desired State**: a [`model::Stack`] of endpoint services and
//!    permission sets, with deferred references between them
//! 2. **Observed State**: discovered fresh each pass by ownership tag
//! 3. **Synthesizer**: matches the two sides, diffs, and applies the
//!    minimal create/update/delete mutations
//!
//! Ownership tags are the only correlation between desired and live state:
//! no identifiers are persisted locally, so every pass re-derives truth
//! from a fresh discovery query and is idempotent by construction.
//!
//! ## Modules
//!
//! - [`model`]: desired-state stacks, resources, and deferred tokens
//! - [`tracking`]: ownership tagging and discovery filters
//! - [`cloud`]: the consumed cloud API boundary
//! - [`sync`]: set diffing, retry policy, resource manager, synthesizer
//! - [`error`]: error hierarchy
//!
//! ## Example
//!
//! ```no_run
//! use privatelink_sync::{
//!     EndpointServiceSpec, LiteralToken, PermissionsSpec, Stack, StackId,
//! };
//!
//! let mut stack = Stack::new(StackId::new("default", "gateway"));
//! let service = stack
//!     .add_endpoint_service(
//!         "endpoint-service",
//!         EndpointServiceSpec {
//!             acceptance_required: Some(true),
//!             network_load_balancer_arns: vec![LiteralToken::shared("arn:nlb-1")],
//!             ..EndpointServiceSpec::default()
//!         },
//!     )
//!     .unwrap();
//! stack
//!     .add_permissions(
//!         "endpoint-service-permissions",
//!         PermissionsSpec {
//!             service_id: service.service_id_token(),
//!             allowed_principals: vec![String::from("arn:aws:iam::123456789012:root")],
//!         },
//!     )
//!     .unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cloud;
pub mod error;
pub mod model;
pub mod sync;
pub mod tracking;

// ============================================================================
// Re-exports
// ============================================================================

pub use cloud::{
    CreateEndpointServiceRequest, EndpointServiceApi, ExistingEndpointService,
    ModifyEndpointServiceRequest, ModifyPermissionsRequest, PermissionsInfo, TagMap,
};
pub use error::{CloudError, Result, StackError, SyncError, SynthesisError, TokenError};
pub use model::{
    EndpointService, EndpointServicePermissions, EndpointServiceSpec, EndpointServiceStatus,
    LiteralToken, PermissionsSpec, Stack, StackId, StringToken,
};
pub use sync::{
    DefaultEndpointServiceManager, EndpointServiceManager, SetDiff, SynthesisReport, Synthesizer,
    string_set_diff,
};
pub use tracking::{TagFilter, TrackingProvider};
