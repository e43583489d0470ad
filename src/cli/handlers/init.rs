use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::data_dir::REGISTRY_FILE;

const REGISTRY_TEMPLATE: &str = r##"# hylle collection registry.
# Each [[collections]] entry maps an id to a storage file and a kind.
#
# [[collections]]
# id = "nes"
# title = "NES"
# subtitle = ""
# kind = "games"          # games or comics
# file = "nes.json"
# seed = "seeds/nes.csv"  # optional pre-seed CSV for an empty collection
"##;

/// Validate that a collection ID is lowercase alphanumeric with hyphens only.
fn validate_collection_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("collection id cannot be empty".to_string());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "invalid collection id \"{}\" — use lowercase with hyphens (e.g. \"game-boy\")",
            id
        ));
    }
    Ok(())
}

/// Parse --collection triples from the flat Vec<String> produced by clap.
/// Each triple is (id, kind, title).
fn parse_collection_triples(args: &[String]) -> Result<Vec<(&str, &str, &str)>, String> {
    let mut out = Vec::new();
    for chunk in args.chunks(3) {
        if chunk.len() != 3 {
            continue;
        }
        let (id, kind, title) = (chunk[0].as_str(), chunk[1].as_str(), chunk[2].as_str());
        validate_collection_id(id)?;
        if kind != "games" && kind != "comics" {
            return Err(format!(
                "invalid kind \"{}\" for collection \"{}\" (expected games or comics)",
                kind, id
            ));
        }
        out.push((id, kind, title));
    }
    Ok(out)
}

/// Render collections.toml with real entries replacing the commented example.
fn render_registry(collections: &[(&str, &str, &str)]) -> String {
    if collections.is_empty() {
        return REGISTRY_TEMPLATE.to_string();
    }
    let mut out = String::from(
        "# hylle collection registry.\n# Each [[collections]] entry maps an id to a storage file and a kind.\n",
    );
    for (id, kind, title) in collections {
        out.push_str(&format!(
            "\n[[collections]]\nid = \"{}\"\ntitle = \"{}\"\nkind = \"{}\"\nfile = \"{}.json\"\n",
            id, title, kind, id
        ));
    }
    out
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let data_dir = cwd.join("hylle");

    if data_dir.is_dir() && !args.force {
        return Err("hylle/ already exists here (pass --force to reinitialize)".into());
    }

    let collections = parse_collection_triples(&args.collection)?;

    fs::create_dir_all(data_dir.join("seeds"))?;
    fs::write(data_dir.join(REGISTRY_FILE), render_registry(&collections))?;

    println!("initialized hylle/ with {} collections", collections.len());
    Ok(())
}
