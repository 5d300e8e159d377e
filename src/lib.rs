//! Skill Router — per-turn intent routing for a conversational skill.
//!
//! The router receives conversational turns from a host bot, runs a
//! global-interruption check (cancel/help/sign-out), classifies intent
//! via an injected NLU classifier, dispatches to named sub-dialogs, and
//! signals end-of-conversation back to the host when running in skill mode.

pub mod activity;
pub mod adapter;
pub mod config;
pub mod dialog;
pub mod error;
pub mod nlu;
pub mod responses;
pub mod router;
pub mod state;
