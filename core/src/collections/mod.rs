//! Small collection helpers shared across the kernel: arena-indexed storage
//! and the macro used to mint new index types.

pub mod ref_store;
