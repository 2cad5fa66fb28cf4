//! Human-facing run report on stdout.

use std::path::Path;

use colored::Colorize;

use crate::api::Bios;
use crate::download;
use crate::mobo::Mobo;
use crate::notes;

fn field(key: &str, value: &str) {
    println!("{} {}", key.cyan(), value.blue());
}

pub fn up_to_date(mobo: &Mobo) {
    println!(
        "{}",
        format!("Your current BIOS for {} {}, is up to date", mobo.name, mobo.current_version).green()
    );
}

/// Headline, release details and one bullet per release note.
pub fn new_bios(mobo: &Mobo, bios: &Bios, file_path: &Path) {
    println!(
        "{}",
        format!("Your current BIOS for {} {}, is not up to date", mobo.name, mobo.current_version).red()
    );
    field("Release Date", &bios.release_date);
    field("Title", &bios.title);
    field("Description", "");
    field("URL", &bios.download_url);

    for note in notes::notes(&bios.description) {
        println!("{}", format!("- {note}").yellow());
    }

    if download::already_downloaded(file_path) {
        field("Downloaded", &file_path.display().to_string());
    }
}

pub fn failure(message: &str) {
    println!("{}", message.red());
}
