use clap::Subcommand;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::cli::utils::{fail, finish_submit, notifier, output_record, show_list};
use crate::cli::{DirectionArg, OutputFormat};
use crate::controller::FormController;
use crate::portal::Portal;
use crate::resources::{BusinessType, TyfcbReferralType, TyfcbSlip, TyfcbSlips};
use crate::types::{link_display, Directed, Direction};

#[derive(Subcommand)]
pub enum TyfcbCommands {
    #[command(about = "List TYFCB slips you gave or received")]
    List {
        #[arg(long, value_enum, default_value_t = DirectionArg::Given)]
        direction: DirectionArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "Show one TYFCB slip")]
    Show { id: String },

    #[command(about = "Thank a member for closed business")]
    Create {
        #[arg(help = "Receiving member id")]
        receiver_id: String,
        #[arg(help = "Business amount")]
        amount: Decimal,
        #[arg(long, default_value = "INR")]
        currency: String,
        #[arg(long, help = "Receiver is outside your chapter")]
        outside: bool,
        #[arg(long, help = "Repeat business rather than new")]
        repeat: bool,
        #[arg(long)]
        comments: Option<String>,
    },
}

fn line(slip: &TyfcbSlip, user_id: &str) -> String {
    let (arrow, other) = match slip.direction_for(user_id) {
        Some(Direction::Received) => ("<-", link_display(slip.giver_id.as_ref())),
        _ => ("->", slip.receiver_name()),
    };
    format!(
        "{}  {} {:<20} {} {}  {}",
        slip.id, arrow, other, slip.amount, slip.currency, slip.business_type
    )
}

pub async fn handle(cmd: TyfcbCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let notifier = notifier(&output_format);

    match cmd {
        TyfcbCommands::List { direction, page } => {
            let user_id = portal.session().user_id().unwrap_or_default();
            let list = portal.list::<TyfcbSlips>(notifier, direction.into());
            show_list(&output_format, &list, page, "TYFCB slips", |s| line(s, &user_id)).await
        }
        TyfcbCommands::Show { id } => match portal.tyfcb().get(&id).await {
            Ok(slip) => output_record(&output_format, &slip),
            Err(e) => fail(&output_format, e),
        },
        TyfcbCommands::Create {
            receiver_id,
            amount,
            currency,
            outside,
            repeat,
            comments,
        } => {
            let list = Arc::new(portal.list::<TyfcbSlips>(notifier.clone(), Direction::Given));
            let form = FormController::new(portal.tyfcb(), list, notifier);
            form.open_create();
            form.edit(|draft| {
                draft.receiver_id = receiver_id;
                draft.amount = amount;
                draft.currency = currency;
                draft.referral_type = if outside { TyfcbReferralType::Outside } else { TyfcbReferralType::Inside };
                draft.business_type = if repeat { BusinessType::Repeat } else { BusinessType::New };
                draft.comments = comments.unwrap_or_default();
            });

            finish_submit(&output_format, "tyfcb", form.submit().await)
        }
    }
}
