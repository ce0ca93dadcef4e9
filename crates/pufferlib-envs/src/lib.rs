//! Structured mock environments for PufferLib.
//!
//! Each one exercises a different path through the emulation layer:
//! - `NestedMock` - nested dict/tuple observations with one element type
//! - `HeteroMock` - mixed element types and a dict action, not seedable
//! - `MockMarl` - multi-agent line walk with a varying population

mod hetero_mock;
mod mock_marl;
mod nested_mock;

pub use hetero_mock::HeteroMock;
pub use mock_marl::MockMarl;
pub use nested_mock::NestedMock;
