//! Key/CSR/certificate issuance CLI over `shaken-core` (§4.7, §6).
//!
//! A thin orchestration layer: every cryptographic or X.509 operation
//! delegates to `shaken-core`; this binary only parses arguments and moves
//! bytes to and from disk.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shaken_core::{CaCertParams, KeyPair, SpCertParams};

#[derive(Parser, Debug)]
#[command(name = "shaken-ca-tool", about = "Key, CSR, and certificate issuance for STIR/SHAKEN")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a fresh ES256 keypair.
    Keys {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        public_key: PathBuf,
    },
    /// Generate a CSR from an existing private key.
    Csr {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        spc: u32,
        #[arg(long)]
        subject_c: String,
        #[arg(long)]
        subject_cn: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Issue a CA or SP certificate.
    Cert {
        #[command(subcommand)]
        cert_cmd: CertCommand,
    },
    /// Copy a trusted CA certificate into a trust directory under its
    /// OpenSSL-style subject-hash filename.
    InstallCert {
        #[arg(long)]
        cert: PathBuf,
        #[arg(long)]
        ca_dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum CertCommand {
    /// Issue a self-signed CA certificate.
    Ca {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        issuer_c: String,
        #[arg(long)]
        issuer_cn: String,
        #[arg(long)]
        serial: u64,
        #[arg(long)]
        expiry_days: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Issue an SP (end-entity) certificate from a CSR, signed by a CA.
    Sp {
        #[arg(long)]
        csr: PathBuf,
        #[arg(long)]
        ca_cert: PathBuf,
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        issuer_c: String,
        #[arg(long)]
        issuer_cn: String,
        #[arg(long)]
        serial: u64,
        #[arg(long)]
        expiry_days: i64,
        #[arg(long)]
        tn_auth_list_uri: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum ToolError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("crypto or I/O error: {0}")]
    Crypto(String),
}

impl From<shaken_core::ShakenError> for ToolError {
    fn from(err: shaken_core::ShakenError) -> Self {
        ToolError::Crypto(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::Crypto(err.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(ToolError::Validation(msg)) => {
            eprintln!("shaken-ca-tool: {msg}");
            ExitCode::from(1)
        }
        Err(ToolError::Crypto(msg)) => {
            eprintln!("shaken-ca-tool: {msg}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<(), ToolError> {
    match cli.cmd {
        Command::Keys { private_key, public_key } => keys(&private_key, &public_key),
        Command::Csr { private_key, spc, subject_c, subject_cn, file } => {
            csr(&private_key, spc, &subject_c, &subject_cn, &file)
        }
        Command::Cert { cert_cmd } => match cert_cmd {
            CertCommand::Ca { private_key, issuer_c, issuer_cn, serial, expiry_days, file } => {
                cert_ca(&private_key, &issuer_c, &issuer_cn, serial, expiry_days, &file)
            }
            CertCommand::Sp {
                csr,
                ca_cert,
                private_key,
                issuer_c,
                issuer_cn,
                serial,
                expiry_days,
                tn_auth_list_uri,
                file,
            } => cert_sp(&csr, &ca_cert, &private_key, &issuer_c, &issuer_cn, serial, expiry_days, &tn_auth_list_uri, &file),
        },
        Command::InstallCert { cert, ca_dir } => install_cert(&cert, &ca_dir),
    }
}

fn keys(private_key_path: &std::path::Path, public_key_path: &std::path::Path) -> Result<(), ToolError> {
    let kp = KeyPair::generate()?;
    std::fs::write(private_key_path, kp.private_key_pem()?)?;
    std::fs::write(public_key_path, kp.public_key_pem()?)?;
    Ok(())
}

fn csr(
    private_key_path: &std::path::Path,
    spc: u32,
    subject_c: &str,
    subject_cn: &str,
    out_path: &std::path::Path,
) -> Result<(), ToolError> {
    if subject_c.len() != 2 {
        return Err(ToolError::Validation(format!(
            "--subject-c must be a 2-letter country code, got {subject_c:?}"
        )));
    }
    let pem = std::fs::read_to_string(private_key_path)?;
    let kp = KeyPair::from_private_pem(&pem)?;
    let csr_pem = shaken_core::x509::generate_csr(&kp, subject_c, subject_cn, spc)?;
    std::fs::write(out_path, csr_pem)?;
    Ok(())
}

fn cert_ca(
    private_key_path: &std::path::Path,
    issuer_c: &str,
    issuer_cn: &str,
    serial: u64,
    expiry_days: i64,
    out_path: &std::path::Path,
) -> Result<(), ToolError> {
    if issuer_c.len() != 2 {
        return Err(ToolError::Validation(format!(
            "--issuer-c must be a 2-letter country code, got {issuer_c:?}"
        )));
    }
    if expiry_days <= 0 {
        return Err(ToolError::Validation("--expiry-days must be positive".into()));
    }
    let pem = std::fs::read_to_string(private_key_path)?;
    let kp = KeyPair::from_private_pem(&pem)?;
    let issued = shaken_core::x509::issue_ca_cert(
        &kp,
        &CaCertParams {
            issuer_c,
            issuer_cn,
            serial,
            validity_days: expiry_days,
        },
    )?;
    std::fs::write(out_path, issued.pem)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cert_sp(
    csr_path: &std::path::Path,
    ca_cert_path: &std::path::Path,
    ca_private_key_path: &std::path::Path,
    issuer_c: &str,
    issuer_cn: &str,
    serial: u64,
    expiry_days: i64,
    tn_auth_list_uri: &str,
    out_path: &std::path::Path,
) -> Result<(), ToolError> {
    if expiry_days <= 0 {
        return Err(ToolError::Validation("--expiry-days must be positive".into()));
    }
    let csr_pem = std::fs::read_to_string(csr_path)?;
    let ca_cert_pem = std::fs::read_to_string(ca_cert_path)?;
    let ca_cert_der = shaken_core::pem_or_der_to_der(ca_cert_pem.as_bytes())?;
    let ca_key_pem = std::fs::read_to_string(ca_private_key_path)?;
    let ca_kp = KeyPair::from_private_pem(&ca_key_pem)?;

    let issued = shaken_core::x509::issue_sp_cert(
        &ca_cert_der,
        &ca_kp,
        &csr_pem,
        &SpCertParams {
            issuer_c,
            issuer_cn,
            serial,
            validity_days: expiry_days,
            tn_auth_list_uri,
        },
    )?;
    std::fs::write(out_path, issued.pem)?;
    Ok(())
}

fn install_cert(cert_path: &std::path::Path, ca_dir: &std::path::Path) -> Result<(), ToolError> {
    let cert_pem = std::fs::read_to_string(cert_path)?;
    let cert_der = shaken_core::pem_or_der_to_der(cert_pem.as_bytes())?;
    let filename = shaken_core::x509::subject_hash_filename(&cert_der)?;
    std::fs::create_dir_all(ca_dir)?;
    std::fs::write(ca_dir.join(filename), cert_pem)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shaken-ca-tool-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn keys_csr_ca_sp_install_round_trips() {
        let dir = workdir();

        let ca_key = dir.join("ca-key.pem");
        let ca_pub = dir.join("ca-pub.pem");
        keys(&ca_key, &ca_pub).unwrap();

        let ca_cert = dir.join("ca-cert.pem");
        cert_ca(&ca_key, "US", "Example Root CA", 1, 3650, &ca_cert).unwrap();

        let sp_key = dir.join("sp-key.pem");
        let sp_pub = dir.join("sp-pub.pem");
        keys(&sp_key, &sp_pub).unwrap();

        let csr_file = dir.join("sp.csr.pem");
        csr(&sp_key, 1234, "US", "Example SP", &csr_file).unwrap();

        let sp_cert = dir.join("sp-cert.pem");
        cert_sp(
            &csr_file,
            &ca_cert,
            &ca_key,
            "US",
            "Example Root CA",
            2,
            365,
            "https://sp.example/tn-auth.json",
            &sp_cert,
        )
        .unwrap();

        let trust_dir = dir.join("trust");
        install_cert(&ca_cert, &trust_dir).unwrap();
        let installed: Vec<_> = std::fs::read_dir(&trust_dir).unwrap().collect();
        assert_eq!(installed.len(), 1);

        let ca_der = shaken_core::pem_or_der_to_der(std::fs::read(&ca_cert).unwrap().as_slice()).unwrap();
        let sp_der = shaken_core::pem_or_der_to_der(std::fs::read(&sp_cert).unwrap().as_slice()).unwrap();
        let outcome = shaken_core::x509::validate_chain(
            &sp_der,
            &[ca_der],
            &[],
            &shaken_core::ChainPolicy::default(),
        )
        .unwrap();
        assert_eq!(outcome.0, shaken_core::ChainOutcome::Ok);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn csr_rejects_invalid_country_code() {
        let dir = workdir();
        let key = dir.join("key.pem");
        keys(&key, &dir.join("pub.pem")).unwrap();
        let err = csr(&key, 1, "USA", "Example SP", &dir.join("out.csr")).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        std::fs::remove_dir_all(&dir).ok();
    }
}
