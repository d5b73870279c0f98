use std::env;
use std::fs::File;
use std::io::BufReader;

use ndskit::Result;
use ndskit::formats::banner::Language;
use ndskit::formats::nds::CatalogReader;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let path = env::args().nth(1).unwrap_or_else(|| "game.nds".to_string());
    let reader = CatalogReader::new(BufReader::new(File::open(path)?))?;
    let catalog = &reader.catalog;

    println!("{} ({})", catalog.header.title, catalog.header.game_code);
    if let Some(banner) = &catalog.banner {
        println!("{}", banner.title(Language::English).replace('\n', " / "));
    }
    for line in catalog.listing() {
        println!("{line}");
    }

    Ok(())
}
