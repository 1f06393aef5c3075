use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use emr_core::catalogue::common_metadata;
use emr_core::config::{metadata_dir_from_env_value, reconcile_policy_from_env_value};
use emr_core::constants::{METADATA_DIR_ENV, RECONCILE_POLICY_ENV};
use emr_core::reporting::{
    last_enrollment, DataConverter, DateOfLastEnrollmentConverter, ProgramEnrollment,
};
use emr_core::{
    CoreConfig, MetadataDescriptor, MetadataError, MetadataKind, MetadataRecord, MetadataService,
    Outcome, ReconcilePolicy, ReconcileReport, StableKey,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "emr")]
#[command(about = "EMR metadata installer CLI")]
struct Cli {
    /// Metadata store directory (defaults to EMR_METADATA_DIR, then ./metadata_store)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the common metadata catalogue
    Install {
        /// install-once or sync (defaults to EMR_RECONCILE_POLICY, then install-once)
        #[arg(long)]
        policy: Option<String>,
    },
    /// List installed metadata records
    List {
        /// Only records of this kind, e.g. encounter_type
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show one installed record
    Show {
        /// Stable key of the record
        key: String,
    },
    /// Print the built-in catalogue without installing it
    Catalogue,
    /// Render a patient's last enrollment date the way reports do
    FormatDate {
        /// Enrolled dates (YYYY-MM-DD) of the patient's enrollments, `-` for an undated one;
        /// none for a patient with no enrollment
        dates: Vec<String>,
    },
    /// Check a value against an installed identifier type's rule
    CheckIdentifier {
        /// Stable key of the identifier type
        key: String,
        /// Value to check
        value: String,
    },
}

fn service(
    dir: Option<PathBuf>,
    policy: Option<String>,
) -> Result<MetadataService, Box<dyn std::error::Error>> {
    let metadata_dir =
        dir.unwrap_or_else(|| metadata_dir_from_env_value(std::env::var(METADATA_DIR_ENV).ok()));
    let policy = match policy {
        Some(policy) => policy.parse::<ReconcilePolicy>()?,
        None => reconcile_policy_from_env_value(std::env::var(RECONCILE_POLICY_ENV).ok())?,
    };
    let cfg = CoreConfig::new(metadata_dir, policy)?;
    Ok(MetadataService::new(Arc::new(cfg)))
}

fn print_descriptor(d: &MetadataDescriptor) {
    println!("{:<24} {}  {}", d.kind(), d.stable_key, d.display_name);
}

fn print_record(r: &MetadataRecord) {
    println!("{:<24} {}  {}", r.kind(), r.stable_key, r.display_name);
}

/// One line per created, updated or skipped descriptor, then one per failure.
fn report_details(report: &ReconcileReport) -> Vec<String> {
    let outcomes = report
        .outcomes
        .iter()
        .filter(|o| !matches!(o.outcome, Outcome::Failed(_)))
        .map(|o| format!("  {:<24} {}  {:?}", o.kind, o.key, o.outcome));
    let failures = report
        .failures
        .iter()
        .map(|f| format!("  {} {}: failed: {}", f.kind, f.key, f.reason));
    outcomes.chain(failures).collect()
}

fn print_report_details(report: &ReconcileReport) {
    for line in report_details(report) {
        println!("{line}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("emr=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Install { policy }) => {
            let service = service(cli.dir, policy)?;
            let report = match service.install_common_metadata() {
                Ok(report) => report,
                Err(MetadataError::StoreUnavailable {
                    key,
                    source,
                    report,
                }) => {
                    eprintln!("Store became unavailable at {key}: {source}");
                    eprintln!("Completed before the failure: {report}");
                    print_report_details(&report);
                    return Err(format!("metadata install aborted at {key}").into());
                }
                Err(e) => return Err(e.into()),
            };
            println!(
                "Installed metadata into {}: {}",
                service.config().metadata_dir().display(),
                report
            );
            print_report_details(&report);
            if !report.is_clean() {
                return Err(format!("{} descriptor(s) failed", report.failed).into());
            }
        }
        Some(Commands::List { kind }) => {
            let kind = kind.map(|k| k.parse::<MetadataKind>()).transpose()?;
            let records = service(cli.dir, None)?.list(kind)?;
            if records.is_empty() {
                println!("No metadata installed.");
            } else {
                for record in &records {
                    print_record(record);
                }
            }
        }
        Some(Commands::Show { key }) => {
            let key = StableKey::parse(&key)?;
            match service(cli.dir, None)?.find(&key)? {
                Some(record) => {
                    print_record(&record);
                    if let Some(description) = &record.description {
                        println!("  description: {description}");
                    }
                    if let Some(rule) = &record.validation_rule {
                        println!("  rule:        {rule}");
                    }
                    if let Some(weight) = record.ordering {
                        println!("  sort weight: {weight}");
                    }
                    println!("  installed:   {}", record.installed_at);
                    println!("  updated:     {}", record.updated_at);
                }
                None => println!("No metadata record with key {key}"),
            }
        }
        Some(Commands::Catalogue) => {
            for descriptor in &common_metadata()? {
                print_descriptor(descriptor);
            }
        }
        Some(Commands::FormatDate { dates }) => {
            let enrollments = dates
                .iter()
                .enumerate()
                .map(|(i, date)| {
                    let enrolled = match date.as_str() {
                        "-" => None,
                        date => Some(NaiveDate::parse_from_str(date, "%Y-%m-%d")?),
                    };
                    Ok(ProgramEnrollment::new(format!("enrollment {}", i + 1), enrolled))
                })
                .collect::<Result<Vec<_>, chrono::ParseError>>()?;
            println!(
                "{}",
                DateOfLastEnrollmentConverter.convert(last_enrollment(&enrollments))
            );
        }
        Some(Commands::CheckIdentifier { key, value }) => {
            let key = StableKey::parse(&key)?;
            if service(cli.dir, None)?.check_identifier(&key, &value)? {
                println!("valid");
            } else {
                return Err(format!("'{value}' is not a valid value for {key}").into());
            }
        }
        None => {
            println!("Use 'emr --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use emr_core::{DescriptorFailure, DescriptorOutcome, FailureReason};

    #[test]
    fn report_details_lists_outcomes_then_failures() {
        let created = StableKey::parse("aaaa").unwrap();
        let broken = StableKey::parse("bbbb").unwrap();
        let reason = FailureReason::Store("disk full".into());
        let report = ReconcileReport {
            created: 1,
            failed: 1,
            outcomes: vec![
                DescriptorOutcome {
                    key: created.clone(),
                    kind: MetadataKind::EncounterType,
                    outcome: Outcome::Created,
                },
                DescriptorOutcome {
                    key: broken.clone(),
                    kind: MetadataKind::VisitType,
                    outcome: Outcome::Failed(reason.clone()),
                },
            ],
            failures: vec![DescriptorFailure {
                key: broken,
                kind: MetadataKind::VisitType,
                reason,
            }],
            ..Default::default()
        };

        let lines = report_details(&report);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("aaaa") && lines[0].ends_with("Created"));
        assert!(lines[1].contains("bbbb: failed:"));
    }

    #[test]
    fn empty_partial_report_has_no_details() {
        assert!(report_details(&ReconcileReport::default()).is_empty());
    }
}
