//! Issue statistics over GitHub repositories
//!
//! # Overview
//!
//! Library computing descriptive statistics over the issue list of a GitHub repository.
//! Given the issues of a repository (fetched through an [`api::IssueClient`] implementation and kept in memory),
//! it groups and counts them along fixed fields: issue state per author, labels, assignees, milestones,
//! comment counts and time-to-close durations, plus an opened/closed activity series over calendar days.
//! Every grouping is a single pass over the list and every issue is counted exactly once per grouping key.

#[cfg(feature = "analysis")]
pub mod analysis;
#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "analysis")]
pub mod timeline;
