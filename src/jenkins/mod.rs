pub mod client;
pub mod wire;

pub use client::{Credentials, JenkinsClient, JenkinsConfig, JenkinsError, JenkinsResult};
pub use wire::{BuildRef, BuildStatus, JobInfo, TestReport};
