use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{fail, output_success};
use crate::cli::OutputFormat;
use crate::portal::Portal;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Request an OTP for a mobile number")]
    Login {
        #[arg(help = "10-digit mobile number")]
        mobile_number: String,
    },

    #[command(about = "Verify the OTP and start a session")]
    Verify {
        #[arg(help = "10-digit mobile number")]
        mobile_number: String,
        #[arg(help = "OTP received by SMS")]
        otp: String,
    },

    #[command(about = "Send the OTP again")]
    Resend {
        #[arg(help = "10-digit mobile number")]
        mobile_number: String,
    },

    #[command(about = "Exchange the current token for a fresh one")]
    Refresh,

    #[command(about = "End the current session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let accounts = portal.accounts();

    match cmd {
        AuthCommands::Login { mobile_number } => match accounts.login(&mobile_number).await {
            Ok(_) => output_success(
                &output_format,
                &format!("OTP sent to {}", mobile_number),
                Some(json!({ "mobile_number": mobile_number })),
            ),
            Err(e) => fail(&output_format, e),
        },
        AuthCommands::Verify { mobile_number, otp } => {
            match accounts.verify_otp(&mobile_number, &otp).await {
                Ok(user_id) => output_success(
                    &output_format,
                    "Logged in successfully",
                    Some(json!({ "user_id": user_id })),
                ),
                Err(e) => fail(&output_format, e),
            }
        }
        AuthCommands::Resend { mobile_number } => match accounts.resend_otp(&mobile_number).await {
            Ok(_) => output_success(
                &output_format,
                &format!("OTP resent to {}", mobile_number),
                None,
            ),
            Err(e) => fail(&output_format, e),
        },
        AuthCommands::Refresh => match accounts.refresh_session().await {
            Ok(user_id) => output_success(
                &output_format,
                "Session refreshed",
                Some(json!({ "user_id": user_id })),
            ),
            Err(e) => fail(&output_format, e),
        },
        AuthCommands::Logout => match accounts.logout().await {
            Ok(()) => output_success(&output_format, "Logged out", None),
            Err(e) => fail(&output_format, e),
        },
        AuthCommands::Status => {
            let session = portal.session();
            if !session.is_authenticated() {
                return output_success(
                    &output_format,
                    "Not logged in",
                    Some(json!({ "authenticated": false })),
                );
            }

            match session.claims() {
                Ok(claims) => {
                    let expires = claims.expires_at().map(|at| at.to_rfc3339());
                    let message = match (&expires, claims.is_expired()) {
                        (Some(at), true) => format!("Logged in as {} (token expired {})", claims.user_id, at),
                        (Some(at), false) => format!("Logged in as {} until {}", claims.user_id, at),
                        (None, _) => format!("Logged in as {}", claims.user_id),
                    };
                    output_success(
                        &output_format,
                        &message,
                        Some(json!({
                            "authenticated": true,
                            "user_id": claims.user_id,
                            "expires_at": expires,
                            "expired": claims.is_expired(),
                        })),
                    )
                }
                Err(e) => fail(&output_format, e.into()),
            }
        }
    }
}
