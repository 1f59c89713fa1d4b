//! Testing utilities for armature-di.
//!
//! - **MockLocator** - map-backed locator recording `has`/`get` calls
//! - **MockFactory** - call-counting factory with a configurable product
//! - **Spy** - records invocations of a wrapped factory
//! - **TestContainer** - container shortcuts for registering test doubles
//! - **Assertions** - instance identity and error kind checks
//!
//! ```
//! use armature_di_testing::*;
//!
//! let container = TestContainer::new();
//! let mock = container
//!     .register_mock("mailer", MockFactory::producing(|| "smtp"))
//!     .unwrap();
//!
//! let first = container.get("mailer").unwrap();
//! assert_same_instance(&first, &container.get("mailer").unwrap());
//! assert_eq!(mock.call_count(), 1);
//! ```

pub mod assertions;
pub mod mock;
pub mod test_container;

pub use assertions::*;
pub use mock::*;
pub use test_container::*;
