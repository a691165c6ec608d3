use std::collections::{HashMap, hash_map::Entry};

use tabled::Table;

use crate::{
    Res,
    config::{Config, PlaylistSettings},
    error, info,
    links::{extract_video_id, load_links},
    management::TokenManager,
    success,
    types::{BatchReport, InsertOutcome},
    utils, warning,
    youtube::{
        auth::GoogleAuthorizer,
        playlist::{PlaylistService, YouTubeClient},
    },
};

/// Exit status of a `--strict` run that skipped at least one link.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Builds a playlist from the configured link source.
///
/// Loading the links, authenticating and creating the playlist are fatal
/// when they fail. Individual links that cannot be added are skipped and
/// listed in the summary; with `strict` the process then exits with
/// [`EXIT_PARTIAL_FAILURE`].
pub async fn create(config: &Config, strict: bool) {
    let links = match load_links(&config.links_path).await {
        Ok(links) => links,
        Err(e) => error!("Cannot load links. Err: {}", e),
    };
    info!(
        "Loaded {} links from {}",
        links.len(),
        config.links_path.display()
    );

    let authorizer = GoogleAuthorizer::new(config);
    let session = match TokenManager::obtain(&config.token_path, &authorizer).await {
        Ok(session) => session,
        Err(e) => error!("Authentication failed. Err: {}", e),
    };

    let client = YouTubeClient::new(&config.api_url, session.access_token());
    let report = match populate_playlist(&client, &config.playlist, &links).await {
        Ok(report) => report,
        Err(e) => error!("Failed to create playlist: {}", e),
    };

    print_summary(&report);

    if strict && !report.is_complete() {
        std::process::exit(EXIT_PARTIAL_FAILURE);
    }
}

/// Creates the playlist and adds every link to it, in order.
///
/// Links without a recognizable video ID and links the API refuses end up in
/// [`BatchReport::failed`] with their original text. Only the playlist
/// creation itself is an error.
pub async fn populate_playlist<P: PlaylistService>(
    service: &P,
    settings: &PlaylistSettings,
    links: &[String],
) -> Res<BatchReport> {
    let playlist_id = service.create_playlist(settings).await?;
    success!("Created playlist: {} (ID: {})", settings.title, playlist_id);

    let mut added = 0;
    let mut failed = Vec::new();
    let mut first_seen: HashMap<String, &str> = HashMap::new();

    for link in links {
        let Some(video_id) = extract_video_id(link) else {
            warning!("[SKIP] Invalid YouTube URL (no video ID): {}", link);
            failed.push(link.clone());
            continue;
        };

        match first_seen.entry(video_id.clone()) {
            Entry::Occupied(earlier) => warning!(
                "Video {} was already listed as {}, adding it again",
                video_id,
                earlier.get()
            ),
            Entry::Vacant(slot) => {
                slot.insert(link);
            }
        }

        match service.insert_item(&playlist_id, &video_id).await {
            InsertOutcome::Added(_) => {
                added += 1;
                success!("Added video: {}", utils::short_link(&video_id));
            }
            InsertOutcome::NotFound => {
                warning!("[SKIP] Video not found (404): {}", link);
                failed.push(link.clone());
            }
            InsertOutcome::Failed(detail) => {
                warning!("[SKIP] Error adding {}: {}", link, detail);
                failed.push(link.clone());
            }
        }
    }

    Ok(BatchReport {
        playlist_id,
        added,
        failed,
    })
}

pub fn print_summary(report: &BatchReport) {
    println!("\n========== SUMMARY ==========");
    info!(
        "{} videos added to playlist {}",
        report.added, report.playlist_id
    );

    if report.is_complete() {
        success!("All links added successfully!");
    } else {
        warning!("These links were skipped (invalid or not found):");
        println!("{}", Table::new(utils::skipped_link_rows(&report.failed)));
    }

    success!("Done!");
}
