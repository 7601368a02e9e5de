use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::SecurityConfig;
use crate::crypto::SecretCipher;

#[derive(Subcommand)]
pub enum SecretCommands {
    #[command(about = "Encrypt plaintext into an iv:ciphertext envelope")]
    Encrypt {
        #[arg(help = "Plaintext to encrypt")]
        plaintext: String,
    },

    #[command(about = "Decrypt an iv:ciphertext envelope")]
    Decrypt {
        #[arg(help = "Envelope produced by `secret encrypt`")]
        envelope: String,
    },
}

pub async fn handle(cmd: SecretCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let security = SecurityConfig::from_env();
    if security.uses_default_key() {
        eprintln!("Warning: ENCRYPTION_KEY not set, using the built-in default key");
    }
    let cipher = SecretCipher::new(&security.encryption_key);

    match cmd {
        SecretCommands::Encrypt { plaintext } => {
            let envelope = cipher.encrypt(&plaintext);
            match output_format {
                OutputFormat::Json => {
                    output_success(&output_format, "Encrypted", Some(json!({ "envelope": envelope })))
                }
                OutputFormat::Text => {
                    println!("{}", envelope);
                    Ok(())
                }
            }
        }
        SecretCommands::Decrypt { envelope } => {
            // strict here: an operator wants to know when the envelope is broken
            let plaintext = cipher.open(&envelope)?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Decrypted",
                    Some(json!({ "plaintext": plaintext })),
                ),
                OutputFormat::Text => {
                    println!("{}", plaintext);
                    Ok(())
                }
            }
        }
    }
}
