use clap::Subcommand;

use crate::cli::utils::{fail, notifier, output_page, show_list};
use crate::cli::{OutputFormat, ScopeArg};
use crate::portal::Portal;
use crate::resources::Member;
use crate::types::image_url;

#[derive(Subcommand)]
pub enum MemberCommands {
    #[command(about = "List members inside or outside your chapter")]
    List {
        #[arg(long, value_enum, default_value_t = ScopeArg::Inside)]
        scope: ScopeArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "First page of both directories")]
    All,
}

fn line(member: &Member, image_prefix: &str) -> String {
    format!(
        "{}  {:<24} {}  {:<20} {}",
        member.id,
        member.name,
        member.mobile_number,
        member.business_name,
        image_url(image_prefix, Some(&member.profile_pic))
    )
}

pub async fn handle(cmd: MemberCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let image_prefix = portal.config().api.image_url.as_str();
    let row = |member: &Member| line(member, image_prefix);

    match cmd {
        MemberCommands::List { scope, page } => {
            let list = portal.member_list(notifier(&output_format), scope.into());
            show_list(&output_format, &list, page, "members", row).await
        }
        MemberCommands::All => {
            let limit = portal.config().pagination.member_page_size;
            match portal.members().all(1, limit).await {
                Ok(lists) => {
                    if let OutputFormat::Text = output_format {
                        println!("Inside chapter:");
                    }
                    output_page(&output_format, "inside", &lists.inside, &[], row)?;
                    if let OutputFormat::Text = output_format {
                        println!("\nOutside chapter:");
                    }
                    output_page(&output_format, "outside", &lists.outside, &[], row)
                }
                Err(e) => fail(&output_format, e),
            }
        }
    }
}
