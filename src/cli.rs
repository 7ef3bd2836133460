// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::ClientConfig;
use crate::core::ServiceClient;
use crate::directory::JobDirectory;
use crate::filter::{FilterCache, FilterField, FilterState};
use crate::identity::IdentityClient;
use crate::session::Session;
use crate::taxonomy::Taxonomy;
use crate::types::{AccountRole, Application, ApplicationStatus, JobRecord, NewJob};
use crate::view_model::{build_view_model, format_posted_date, JobCard};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Search, post and apply to jobs on the job board")]
pub struct JobBoardCli {
    #[command(subcommand)]
    pub command: JobBoardCommand,

    /// Configuration file (defaults to ./jobboard.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum JobBoardCommand {
    /// Search jobs
    Search {
        /// Job title or keyword
        #[arg(short, long)]
        query: Option<String>,
        /// Page query string to start from, e.g. "?search=java+developer"
        #[arg(long)]
        from_url: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Employment type (Remote, Full-time, Part-time)
        #[arg(short = 't', long = "type")]
        employment_type: Option<String>,
        /// Experience level (Internship, Entry-level, Mid-level, Senior-level)
        #[arg(short = 'e', long)]
        level: Option<String>,
        /// Also send the filters to the service instead of only filtering locally
        #[arg(long)]
        server_side: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show job details
    Show { id: String },
    /// Post a new job described by a YAML file
    Post { file: PathBuf },
    /// Replace a job's data with a YAML file
    Update { id: String, file: PathBuf },
    /// Delete a job
    Delete { id: String },
    /// Apply to a job
    Apply {
        id: String,
        #[arg(long)]
        cover_letter: Option<String>,
        #[arg(long)]
        resume_url: Option<String>,
    },
    /// List applicants for one of your jobs, or move one to another stage
    Applicants {
        id: String,
        /// Review stage change (pending, shortlisted, accepted, rejected)
        #[arg(long = "set", value_name = "APP_ID=STATUS")]
        set_status: Option<String>,
    },
    /// Print the available filter values
    Taxonomy,
    /// Log in and keep the bearer token
    Login {
        email: String,
        #[arg(long)]
        password: String,
        /// Log in as an organisation instead of a job seeker
        #[arg(long)]
        organisation: bool,
    },
    /// Show the logged-in user
    Whoami,
    /// Forget the stored token
    Logout,
}

pub async fn handle_command(command: JobBoardCommand, config: &ClientConfig, session: Arc<Session>) -> Result<()> {
    let directory = JobDirectory::new(
        ServiceClient::new(&config.api_url, config.timeout_seconds, Arc::clone(&session))?,
        Arc::clone(&session),
    );
    let identity = IdentityClient::new(ServiceClient::new(
        config.identity_url(),
        config.timeout_seconds,
        Arc::clone(&session),
    )?);

    match command {
        JobBoardCommand::Search {
            query,
            from_url,
            location,
            category,
            employment_type,
            level,
            server_side,
            json,
        } => {
            let state = build_filter_state(
                from_url.as_deref(),
                query.as_deref(),
                &[
                    (FilterField::Location, location.as_deref()),
                    (FilterField::Category, category.as_deref()),
                    (FilterField::EmploymentType, employment_type.as_deref()),
                    (FilterField::ExperienceLevel, level.as_deref()),
                ],
            )?;
            debug!("Searching with {:?}", state);

            let snapshot = directory
                .fetch_all(server_side.then_some(&state))
                .await
                .context("Failed to fetch jobs")?;

            let mut cache = FilterCache::new();
            let view = build_view_model(&cache.results(&snapshot, &state));

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            println!("{}", view.headline());
            if !view.is_empty {
                println!(
                    "{:<8} {:<30} {:<20} {:<14} {:<12} {:>18}",
                    "ID", "TITLE", "EMPLOYER", "TYPE", "LEVEL", "POSTED"
                );
                println!("{}", "-".repeat(107));
                for card in view.cards() {
                    println!(
                        "{:<8} {:<30} {:<20} {:<14} {:<12} {:>18}",
                        truncate(&card.id, 8),
                        truncate(&card.title, 28),
                        truncate(&card.employer, 18),
                        card.employment_type,
                        card.experience_level,
                        card.posted
                    );
                }
            }
            if snapshot.dropped > 0 {
                println!("({} malformed listings skipped)", snapshot.dropped);
            }
            let qs = state.to_query_string();
            if !qs.is_empty() {
                println!("\nShare: ?{}", qs);
            }
        }

        JobBoardCommand::Show { id } => {
            let job = directory.fetch_by_id(&id).await.context("Failed to load job")?;
            print_job(&job);
        }

        JobBoardCommand::Post { file } => {
            let draft = read_job_file(&file)?;
            let job = directory.create(&draft).await.context("Failed to post job")?;
            println!("Posted job #{} - {}", job.id, job.title);
        }

        JobBoardCommand::Update { id, file } => {
            let draft = read_job_file(&file)?;
            let job = directory
                .update(&id, &draft)
                .await
                .context("Failed to update job")?;
            println!("Updated job #{} - {}", job.id, job.title);
        }

        JobBoardCommand::Delete { id } => {
            directory.delete(&id).await.context("Failed to delete job")?;
            println!("Deleted job #{}", id);
        }

        JobBoardCommand::Apply {
            id,
            cover_letter,
            resume_url,
        } => {
            let application = Application {
                cover_letter,
                resume_url,
            };
            let receipt = directory
                .apply(&id, &application)
                .await
                .context("Failed to submit application")?;
            println!("Application for job #{}: {}", receipt.job_id, receipt.status);
            if let Some(message) = receipt.message {
                println!("{}", message);
            }
        }

        JobBoardCommand::Applicants {
            id,
            set_status: Some(change),
        } => {
            let (application_id, status) = parse_status_change(&change)?;
            let applicant = directory
                .update_application_status(&id, &application_id, status)
                .await
                .context("Failed to update application status")?;
            println!(
                "{} is now {}",
                applicant.name.unwrap_or(application_id),
                status.label()
            );
        }

        JobBoardCommand::Applicants { id, set_status: None } => {
            let list = directory
                .applicants(&id)
                .await
                .context("Failed to load applicants")?;
            println!("{} applicants have applied", list.count());
            for applicant in list.applicants {
                println!(
                    "  [{}] {} <{}> {}",
                    applicant
                        .id
                        .map(|id| id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string()))
                        .unwrap_or_default(),
                    applicant.name.unwrap_or_default(),
                    applicant.email.unwrap_or_default(),
                    applicant.status.unwrap_or_default()
                );
            }
        }

        JobBoardCommand::Taxonomy => {
            for taxonomy in Taxonomy::ALL {
                println!("{}:", taxonomy.name());
                for entry in taxonomy.entries() {
                    println!("  {:<26} {}", entry.code, entry.label);
                }
            }
        }

        JobBoardCommand::Login {
            email,
            password,
            organisation,
        } => {
            let role = organisation.then_some(AccountRole::Organisation);
            let user = identity
                .login(&email, &password, role)
                .await
                .context("Login failed")?;
            match user.as_ref().and_then(|u| u.display_name()) {
                Some(name) => println!("Welcome, {}", name),
                None => println!("Logged in as {}", email),
            }
        }

        JobBoardCommand::Whoami => {
            let user = identity.current_user().await.context("Failed to resolve user")?;
            println!(
                "{} ({})",
                user.display_name()
                    .map(str::to_string)
                    .or_else(|| user.email.clone())
                    .unwrap_or_else(|| user.id.to_string()),
                match user.role {
                    Some(AccountRole::Organisation) => "organisation",
                    Some(AccountRole::JobSeeker) => "job seeker",
                    None => "unknown role",
                }
            );
        }

        JobBoardCommand::Logout => {
            identity.logout();
            println!("Logged out");
        }
    }

    Ok(())
}

/// Start from the page URL, then layer explicit flags on top
fn build_filter_state(
    from_url: Option<&str>,
    query: Option<&str>,
    structured: &[(FilterField, Option<&str>)],
) -> Result<FilterState> {
    let mut state = from_url
        .map(FilterState::parse_from_query_string)
        .unwrap_or_default();

    if let Some(query) = query {
        state = state.with_field(FilterField::Query, Some(query))?;
    }
    for (field, value) in structured {
        if value.is_some() {
            state = state.with_field(*field, *value)?;
        }
    }

    Ok(state)
}

/// `APP_ID=STATUS`, with the status checked against the review stages
fn parse_status_change(change: &str) -> Result<(String, ApplicationStatus)> {
    let (application_id, status) = change
        .split_once('=')
        .filter(|(id, _)| !id.trim().is_empty())
        .with_context(|| format!("Expected APP_ID=STATUS, got '{}'", change))?;
    Ok((application_id.trim().to_string(), ApplicationStatus::parse(status)?))
}

fn read_job_file(path: &Path) -> Result<NewJob> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file: {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse job file: {}", path.display()))
}

fn print_job(job: &JobRecord) {
    let card = JobCard::from(job);
    println!("Job #{}", card.id);
    println!("Title: {}", card.title);
    if !card.employer.is_empty() {
        println!("Employer: {}", card.employer);
    }
    if !card.location.is_empty() {
        println!("Location: {}", card.location);
    }
    println!("Industry: {}", card.category);
    println!("Type: {}", card.employment_type);
    println!("Level: {}", card.experience_level);
    if !card.salary.is_empty() {
        println!("Salary: {}", card.salary);
    }
    println!("Posted: {}", format_posted_date(&job.posted_at));
    if !job.description.is_empty() {
        println!("\n{}", job.description);
    }

    for (heading, items) in [
        ("Responsibilities", &job.responsibilities),
        ("Qualifications", &job.qualifications),
        ("Benefits", &job.benefits),
    ] {
        if !items.is_empty() {
            println!("\n{}:", heading);
            for item in items {
                println!("  - {}", item);
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_layer_over_url() {
        let state = build_filter_state(
            Some("?search=nurse"),
            None,
            &[(FilterField::Category, Some("Healthcare"))],
        )
        .unwrap();
        assert_eq!(state.query, "nurse");
        assert_eq!(state.category.as_deref(), Some("healthcare"));

        let state = build_filter_state(Some("search=nurse"), Some("chef"), &[]).unwrap();
        assert_eq!(state.query, "chef");
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let err = build_filter_state(None, None, &[(FilterField::ExperienceLevel, Some("guru"))]);
        assert!(err.is_err());
    }

    #[test]
    fn test_status_change_argument() {
        let (id, status) = parse_status_change("app-7=Shortlisted").unwrap();
        assert_eq!(id, "app-7");
        assert_eq!(status, ApplicationStatus::Shortlisted);

        assert!(parse_status_change("app-7").is_err());
        assert!(parse_status_change("=accepted").is_err());
        assert!(parse_status_change("app-7=hired").is_err());

        let cli = JobBoardCli::try_parse_from(["jobboard", "applicants", "12", "--set", "app-7=rejected"])
            .unwrap();
        match cli.command {
            JobBoardCommand::Applicants { id, set_status } => {
                assert_eq!(id, "12");
                assert_eq!(set_status.as_deref(), Some("app-7=rejected"));
            }
            _ => panic!("expected applicants"),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Nurse", 10), "Nurse");
        assert_eq!(truncate("Senior Backend Engineer", 10), "Senior ...");
    }

    #[test]
    fn test_cli_parses_search_flags() {
        let cli = JobBoardCli::try_parse_from([
            "jobboard", "search", "-q", "backend", "--type", "Full-time", "--server-side",
        ])
        .unwrap();
        match cli.command {
            JobBoardCommand::Search {
                query,
                employment_type,
                server_side,
                ..
            } => {
                assert_eq!(query.as_deref(), Some("backend"));
                assert_eq!(employment_type.as_deref(), Some("Full-time"));
                assert!(server_side);
            }
            _ => panic!("expected search"),
        }
    }
}
