//! Property-based tests for the phoneme algebra and rule parsing.
//!
//! The scenario tests next to each module pin down individual behaviors;
//! the properties here check the algebraic laws across generated inputs:
//! append/join laws for phonemes, ordering laws for `compare`, and
//! parse/render idempotence for phoneme expressions.
