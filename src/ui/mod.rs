//! Terminal rendering. This is the stand-in for the original page: metadata
//! panel, folder picker, progress bars, result links.

use std::io::{Write, stdout};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};

use crate::api::{DriveFolder, HistoryEntry, VideoInfo};
use crate::core::Operation;
use crate::progress::ProgressInfo;
use crate::utils::format_duration;

const BAR_WIDTH: usize = 30;

pub fn op_label(op: Operation) -> &'static str {
    match op {
        Operation::DriveUpload => "Drive",
        Operation::Republish => "YouTube",
    }
}

/// Redraw the in-place progress bar line.
pub fn render_progress(op: Operation, info: &ProgressInfo) {
    let filled = ((info.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let mut out = stdout();
    let _ = execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
    let _ = write!(
        out,
        "{}: [{}{}] {:>3.0}% {}",
        op_label(op),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        info.percentage,
        info.stage,
    );
    let _ = out.flush();
    if info.percentage >= 100.0 {
        let _ = writeln!(out);
    }
}

pub fn clear_progress_line() {
    let mut out = stdout();
    let _ = execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
    let _ = out.flush();
}

pub fn print_metadata(info: &VideoInfo) {
    println!("Title:     {}", info.title);
    println!("Duration:  {}", info.formatted_duration());
    println!("Uploader:  {}", info.uploader_display());
    println!("Thumbnail: {}", info.thumbnail_or_placeholder());
}

/// The folder picker: a leading placeholder entry, then the listing.
pub fn print_folders(folders: &[DriveFolder]) {
    println!("  0) Select a folder...");
    for (index, folder) in folders.iter().enumerate() {
        println!("  {}) {} ({})", index + 1, folder.name, folder.id);
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No downloads yet.");
        return;
    }
    for entry in entries {
        let date = entry
            .download_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut flags = String::new();
        if entry.uploaded_to_drive {
            flags.push_str(" [drive]");
        }
        if entry.uploaded_to_youtube {
            flags.push_str(" [youtube]");
        }
        println!(
            "  {}  {}  {}  {}{}",
            date,
            format_duration(entry.duration),
            entry.title,
            entry.uploader.as_deref().unwrap_or("unknown"),
            flags,
        );
    }
}

pub fn show_error(message: &dyn std::fmt::Display) {
    eprintln!("Error: {message}");
}
