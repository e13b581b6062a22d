use sitetree::commands::command_argument_builder;
use sitetree::handlers::{handle_export, handle_tree, handle_view, print_banner};

#[tokio::main]
async fn main() {
    let mut cmd = command_argument_builder();
    let chosen_command = cmd.clone().get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("view", primary_command)) => handle_view(primary_command).await,
        Some(("tree", primary_command)) => handle_tree(primary_command).await,
        Some(("export", primary_command)) => handle_export(primary_command).await,
        Some(_) => unreachable!("clap should ensure we don't get here"),
        None => {
            // No subcommand provided, show usage after the banner
            let _ = cmd.print_help();
        }
    }
}
