//! Integration-level tests for the kernel: worked end-to-end scenarios and
//! cross-cutting invariants that hold across arbitrary inputs, plus the
//! randomized fixture generator they share.

mod support;

mod properties;
