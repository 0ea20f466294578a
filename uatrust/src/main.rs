//! uatrust: Command-line front end for the certificate trust-decision engine.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use uatrust_lib::{
    thumbprint, verify_application_uri, verify_certificate_at, CertificateStore, DigestAlgorithm,
    Verdict,
};

#[derive(Parser)]
#[command(
    name = "uatrust",
    about = "Verify peer certificates against explicit trust, issuer, and revocation lists",
    long_about = "uatrust drives the trust-decision engine from the command line:\n\
                  load trust material from files or directories, verify one or\n\
                  more peer certificates (PEM or DER, optionally with a bundled\n\
                  chain), and print the verdict for each.\n\n\
                  Exit status is non-zero when any certificate is rejected.",
    after_help = "EXAMPLES:\n\
                  \n  uatrust verify --trusted-dir pki/trusted --issuers-dir pki/issuers \\\n      --crls-dir pki/crls server.pem\
                  \n  uatrust verify --trusted root_ca.pem --issuers intermediate.pem chain.pem\
                  \n  uatrust verify --trusted root_ca.pem --application-uri urn:example:server server.pem\
                  \n  uatrust verify --json --trusted root_ca.pem *.pem\
                  \n  uatrust thumbprint server.pem"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify certificates and print one verdict per input file
    Verify {
        /// Certificate files to verify (PEM or DER; a file may contain a
        /// bundled chain, end-entity first)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Trusted certificate file(s) (repeatable)
        #[arg(long = "trusted")]
        trusted_files: Vec<PathBuf>,
        /// Intermediate-issuer certificate file(s) (repeatable)
        #[arg(long = "issuers")]
        issuer_files: Vec<PathBuf>,
        /// Revocation list file(s) (repeatable)
        #[arg(long = "crls")]
        crl_files: Vec<PathBuf>,
        /// Directory of trusted certificates (requires the other two dirs)
        #[arg(long)]
        trusted_dir: Option<PathBuf>,
        /// Directory of intermediate-issuer certificates
        #[arg(long)]
        issuers_dir: Option<PathBuf>,
        /// Directory of revocation lists
        #[arg(long)]
        crls_dir: Option<PathBuf>,
        /// Also check that this application URI is present in the
        /// certificate's alternative names
        #[arg(long)]
        application_uri: Option<String>,
        /// Verify at a specific Unix timestamp instead of the current time
        #[arg(long)]
        attime: Option<i64>,
        /// Output a JSON report instead of text
        #[arg(long)]
        json: bool,
        /// Only print rejected certificates
        #[arg(long)]
        failures_only: bool,
    },
    /// Print the thumbprint of each certificate file
    Thumbprint {
        /// Certificate files (PEM or DER)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Use SHA-256 instead of SHA-1
        #[arg(long)]
        sha256: bool,
    },
}

/// Per-file verification outcome, printable as text or JSON.
#[derive(Serialize)]
struct VerifyReport {
    path: String,
    thumbprint: Option<String>,
    verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri_verdict: Option<Verdict>,
}

impl VerifyReport {
    fn accepted(&self) -> bool {
        self.verdict.is_good() && self.uri_verdict.map_or(true, |v| v.is_good())
    }
}

impl std::fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.verdict)?;
        if let Some(uri) = self.uri_verdict {
            write!(f, ", applicationUri: {}", uri)?;
        }
        if let Some(ref tp) = self.thumbprint {
            write!(f, " [{}]", tp)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            files,
            trusted_files,
            issuer_files,
            crl_files,
            trusted_dir,
            issuers_dir,
            crls_dir,
            application_uri,
            attime,
            json,
            failures_only,
        } => {
            let store = build_store(
                &trusted_files,
                &issuer_files,
                &crl_files,
                trusted_dir,
                issuers_dir,
                crls_dir,
            )?;
            let at_time = attime.unwrap_or_else(now_ts);

            let reports: Vec<VerifyReport> = files
                .par_iter()
                .map(|path| verify_one(&store, path, at_time, application_uri.as_deref()))
                .collect();

            let rejected = reports.iter().filter(|r| !r.accepted()).count();
            if json {
                let shown: Vec<&VerifyReport> = reports
                    .iter()
                    .filter(|r| !failures_only || !r.accepted())
                    .collect();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                for report in &reports {
                    if failures_only && report.accepted() {
                        continue;
                    }
                    println!("{}", report);
                }
            }
            if rejected > 0 {
                std::process::exit(1);
            }
        }
        Commands::Thumbprint { files, sha256 } => {
            let algorithm = if sha256 {
                DigestAlgorithm::Sha256
            } else {
                DigestAlgorithm::Sha1
            };
            for path in &files {
                let data = std::fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let ders = uatrust_lib::split_certificate_blob(&data)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                for der in &ders {
                    println!("{}: {}", path.display(), thumbprint(der, algorithm));
                }
            }
        }
    }
    Ok(())
}

/// Build the store from either three directories or explicit file lists.
fn build_store(
    trusted_files: &[PathBuf],
    issuer_files: &[PathBuf],
    crl_files: &[PathBuf],
    trusted_dir: Option<PathBuf>,
    issuers_dir: Option<PathBuf>,
    crls_dir: Option<PathBuf>,
) -> Result<CertificateStore> {
    let any_dir = trusted_dir.is_some() || issuers_dir.is_some() || crls_dir.is_some();
    let any_file = !trusted_files.is_empty() || !issuer_files.is_empty() || !crl_files.is_empty();

    if any_dir {
        if any_file {
            bail!("--trusted-dir/--issuers-dir/--crls-dir cannot be combined with file-based trust material");
        }
        let (Some(trusted), Some(issuers), Some(crls)) = (trusted_dir, issuers_dir, crls_dir)
        else {
            bail!("directory mode requires --trusted-dir, --issuers-dir, and --crls-dir together");
        };
        return CertificateStore::from_directories(&trusted, &issuers, &crls)
            .context("failed to load trust material from directories");
    }

    if trusted_files.is_empty() {
        bail!("no trust material given: use --trusted or --trusted-dir");
    }
    let trusted = read_all(trusted_files)?;
    let issuers = read_all(issuer_files)?;
    let crls = read_all(crl_files)?;
    CertificateStore::from_der_lists(&trusted, &issuers, &crls)
        .context("failed to load trust material")
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    paths
        .iter()
        .map(|p| std::fs::read(p).with_context(|| format!("failed to read {}", p.display())))
        .collect()
}

fn verify_one(
    store: &CertificateStore,
    path: &PathBuf,
    at_time: i64,
    application_uri: Option<&str>,
) -> VerifyReport {
    let label = path.display().to_string();
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(_) => {
            return VerifyReport {
                path: label,
                thumbprint: None,
                verdict: Verdict::CertificateInvalid,
                uri_verdict: None,
            }
        }
    };
    let tp = uatrust_lib::split_certificate_blob(&data)
        .ok()
        .and_then(|ders| ders.first().map(|d| thumbprint(d, DigestAlgorithm::Sha1)));
    let verdict = verify_certificate_at(store, &data, at_time);
    let uri_verdict = match application_uri {
        Some(uri) if verdict.is_good() => Some(verify_application_uri(&data, uri)),
        _ => None,
    };
    VerifyReport {
        path: label,
        thumbprint: tp,
        verdict,
        uri_verdict,
    }
}

fn now_ts() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
