use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::{fail, finish_submit, notifier, output_record, output_success, show_list};
use crate::cli::{DirectionArg, OutputFormat};
use crate::controller::FormController;
use crate::portal::Portal;
use crate::resources::{Referral, ReferralType, Referrals};
use crate::types::{link_display, rating_stars, Directed, Direction};

#[derive(Subcommand)]
pub enum ReferralCommands {
    #[command(about = "List referrals you gave or received")]
    List {
        #[arg(long, value_enum, default_value_t = DirectionArg::Given)]
        direction: DirectionArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "Pass a referral to another member")]
    Create {
        #[arg(help = "Receiving member id")]
        receiver_id: String,
        #[arg(help = "Contact's 10-digit mobile number")]
        mobile_number: String,
        #[arg(long, help = "Contact name")]
        referral: Option<String>,
        #[arg(long)]
        business_name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long, default_value_t = 1, help = "Rating from 1 to 5")]
        rating: u8,
        #[arg(long, help = "Receiver is outside your chapter")]
        outside: bool,
        #[arg(long, help = "Told them you would call")]
        told: bool,
        #[arg(long, help = "Gave them your card")]
        card: bool,
    },

    #[command(about = "Delete a referral")]
    Delete { id: String },

    #[command(about = "Given/received totals")]
    Stats,
}

/// Shows the member on the other side from `user_id`
fn line(referral: &Referral, user_id: &str) -> String {
    let (arrow, other) = match referral.direction_for(user_id) {
        Some(Direction::Received) => ("<-", referral.giver_id.as_ref()),
        _ => ("->", referral.receiver_id.as_ref()),
    };
    format!(
        "{}  {} {:<20} {}  {}",
        referral.id,
        arrow,
        link_display(other),
        rating_stars(referral.rating),
        referral.business_name
    )
}

pub async fn handle(cmd: ReferralCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let notifier = notifier(&output_format);

    match cmd {
        ReferralCommands::List { direction, page } => {
            let user_id = portal.session().user_id().unwrap_or_default();
            let list = portal.list::<Referrals>(notifier, direction.into());
            show_list(&output_format, &list, page, "referrals", |r| line(r, &user_id)).await
        }
        ReferralCommands::Create {
            receiver_id,
            mobile_number,
            referral,
            business_name,
            address,
            comments,
            rating,
            outside,
            told,
            card,
        } => {
            let list = Arc::new(portal.list::<Referrals>(notifier.clone(), Direction::Given));
            let form = FormController::new(portal.referrals(), list, notifier);
            form.open_create();
            form.edit(|draft| {
                draft.receiver_id = receiver_id;
                draft.mobile_number = mobile_number;
                draft.referral = referral.unwrap_or_default();
                draft.business_name = business_name.unwrap_or_default();
                draft.address = address.unwrap_or_default();
                draft.comments = comments.unwrap_or_default();
                draft.rating = rating;
                draft.referral_type = if outside { ReferralType::Outside } else { ReferralType::Inside };
                draft.referral_status.told_them_you_would_will = told;
                draft.referral_status.given_card = card;
            });

            finish_submit(&output_format, "referral", form.submit().await)
        }
        ReferralCommands::Delete { id } => match portal.referrals().delete(&id).await {
            Ok(()) => output_success(&output_format, &format!("Referral '{}' deleted successfully", id), None),
            Err(e) => fail(&output_format, e),
        },
        ReferralCommands::Stats => match portal.referrals().stats().await {
            Ok(stats) => output_record(&output_format, &stats),
            Err(e) => fail(&output_format, e),
        },
    }
}
