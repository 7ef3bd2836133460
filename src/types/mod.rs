// src/types/mod.rs
pub mod job;
pub mod raw;
pub mod response;

pub use job::{JobRecord, NewJob};
pub use raw::RawJob;
pub use response::{
    AccountRole, Applicant, ApplicantList, Application, ApplicationReceipt, ApplicationStatus,
    UserProfile,
};
