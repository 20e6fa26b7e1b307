use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use ferry::api::{PrivacyStatus, PublishForm};
use ferry::config::get_config;
use ferry::{FlowEvent, HttpBackend, WorkflowController, ui};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = get_config();
    let backend = HttpBackend::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
        .context("invalid backend endpoint")?;
    let mut controller = WorkflowController::new(backend);

    // Progress events arrive while an operation is still awaited, so the bar
    // renders from its own task.
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                FlowEvent::Progress { op, info } => ui::render_progress(op, &info),
                FlowEvent::ProgressHidden { .. } => ui::clear_progress_line(),
                _ => {}
            }
        }
    });

    // The page-load folder listing; errors here are surfaced, unlike the
    // post-download refresh.
    if config.auth_success {
        match controller.list_folders_at_startup().await {
            Ok(count) => println!("Loaded {count} Drive folders."),
            Err(err) => ui::show_error(&format!("Error loading folders: {err}")),
        }
    }

    println!("ferry - video download/upload workflow. Type 'help' for commands.");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut current_url = String::new();

    while let Some(line) = next_line(&mut input).await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => print_help(),
            "info" => {
                current_url = rest.to_string();
                match controller.fetch_metadata(&current_url).await {
                    Ok(info) => {
                        ui::print_metadata(&info);
                        println!("Download enabled. Run 'download' to fetch it server-side.");
                    }
                    Err(err) => ui::show_error(&format!("Error fetching video info: {err}")),
                }
            }
            "download" => match controller.start_download(&current_url).await {
                Ok(video) => {
                    println!("Download complete: {}", video.filename);
                    if !controller.view().folders.is_empty() {
                        ui::print_folders(&controller.view().folders);
                    }
                }
                Err(err) => ui::show_error(&format!("Download error: {err}")),
            },
            "folders" => ui::print_folders(&controller.view().folders),
            "drive" => {
                let folder_id = resolve_folder(&controller, rest);
                match controller.upload_to_drive(&folder_id).await {
                    Ok(result) => match result.view_link() {
                        Some(link) => println!("View in Drive: {link}"),
                        None => println!("Uploaded to Drive."),
                    },
                    Err(err) => ui::show_error(&format!("Upload error: {err}")),
                }
            }
            "publish" => {
                let outcome = controller.republish_original().await;
                handle_publish(&mut controller, &mut input, outcome).await?;
            }
            "publish-custom" => {
                let form = read_publish_form(&mut input, &controller).await?;
                let outcome = controller.republish_custom(form).await;
                handle_publish(&mut controller, &mut input, outcome).await?;
            }
            "save" => match controller.save_locally(&config.output_dir).await {
                Ok(path) => println!("Saved to {}", path.display()),
                Err(err) => ui::show_error(&format!("Error downloading file: {err}")),
            },
            "history" => match controller.history().await {
                Ok(entries) => ui::print_history(&entries),
                Err(err) => ui::show_error(&format!("Error getting history: {err}")),
            },
            "auth" => println!("Open {} in a browser to authenticate.", controller.auth_url()),
            "quit" | "exit" => break,
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }

    Ok(())
}

async fn next_line(input: &mut Input) -> Result<Option<String>> {
    print!("> ");
    std::io::stdout().flush().ok();
    Ok(input.next_line().await?)
}

fn print_help() {
    println!("  info <url>       fetch video metadata");
    println!("  download         download the video server-side");
    println!("  folders          list Drive destination folders");
    println!("  drive <n>        upload to the n-th listed folder");
    println!("  publish          republish to YouTube with original metadata");
    println!("  publish-custom   republish with custom metadata");
    println!("  save             save the file locally");
    println!("  history          show download history");
    println!("  auth             print the authentication URL");
    println!("  quit             exit");
}

/// Map a picker selection onto a folder id. `0`, blank, or an out-of-range
/// number is the placeholder - the controller rejects it as unselected.
fn resolve_folder<B: ferry::Backend>(controller: &WorkflowController<B>, choice: &str) -> String {
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 {
            if let Some(folder) = controller.view().folders.get(index - 1) {
                return folder.id.clone();
            }
        }
        return String::new();
    }
    choice.to_string()
}

async fn handle_publish<B: ferry::Backend>(
    controller: &mut WorkflowController<B>,
    input: &mut Input,
    outcome: ferry::Result<ferry::api::PublishResult>,
) -> Result<()> {
    match outcome {
        Ok(result) => {
            println!("Upload Complete! View on YouTube: {}", result.watch_url());
        }
        Err(err) if err.needs_reauth() => {
            ui::show_error(&err);
            let question = "YouTube API permissions missing. Would you like to log out and \
                            log back in to grant needed permissions?";
            if confirm(input, question).await? {
                if let Err(logout_err) = controller.logout().await {
                    ui::show_error(&format!("Logout failed: {logout_err}"));
                } else {
                    println!(
                        "Logged out. Open {} to re-authenticate.",
                        controller.auth_url()
                    );
                }
            }
        }
        Err(err) => ui::show_error(&format!("YouTube upload error: {err}")),
    }
    Ok(())
}

async fn confirm(input: &mut Input, question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().ok();
    let answer = input.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn read_publish_form<B: ferry::Backend>(
    input: &mut Input,
    controller: &WorkflowController<B>,
) -> Result<PublishForm> {
    // Pre-fill the title from the rendered metadata, like the original form.
    let default_title = controller
        .view()
        .video_info
        .as_ref()
        .map(|info| info.title.clone())
        .unwrap_or_default();

    let title = ask(input, &format!("Title [{default_title}]")).await?;
    let description = ask(input, "Description []").await?;
    let tags = ask(input, "Tags (comma separated) []").await?;
    let privacy = ask(input, "Privacy (public/unlisted/private) [private]").await?;

    Ok(PublishForm {
        title: if title.is_empty() { default_title } else { title },
        description,
        tags,
        privacy_status: match privacy.as_str() {
            "public" => PrivacyStatus::Public,
            "unlisted" => PrivacyStatus::Unlisted,
            _ => PrivacyStatus::Private,
        },
    })
}

async fn ask(input: &mut Input, label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush().ok();
    Ok(input.next_line().await?.unwrap_or_default().trim().to_string())
}
