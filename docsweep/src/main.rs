use commands::command_argument_builder;
use docsweep::handlers::handle_crawl;
use docsweep_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => {
            let code = handle_crawl(primary_command, quiet, verbose).await;
            std::process::exit(code);
        }
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
