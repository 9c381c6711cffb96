// build.rs

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

fn main() {
    // --- 1. Pick the message language ---
    // `lang_*` features win over the CMDLET_LANG variable; English is the fallback.
    let mut active_langs: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    active_langs.sort();

    let lang = match active_langs.first() {
        Some(first) => {
            if active_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    active_langs, first
                );
            }
            first.clone()
        }
        None => env::var("CMDLET_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    };

    println!("cargo:rustc-env=CMDLET_LANG_EFFECTIVE={}", lang);
    println!("cargo:rerun-if-env-changed=CMDLET_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    // --- 2. Load the English catalogue, then overlay the selected language ---
    let fallback_path = format!("locales/{}.toml", FALLBACK_LANG);
    let fallback_content = fs::read_to_string(&fallback_path)
        .unwrap_or_else(|_| panic!("Failed to read fallback message file: {}", fallback_path));
    let mut messages: HashMap<String, String> = toml::from_str(&fallback_content)
        .unwrap_or_else(|_| panic!("Failed to parse {}", fallback_path));

    if lang != FALLBACK_LANG {
        let lang_path = format!("locales/{}.toml", lang);
        match fs::read_to_string(&lang_path) {
            Ok(content) => {
                let overlay: HashMap<String, String> = toml::from_str(&content)
                    .unwrap_or_else(|_| panic!("Failed to parse {}", lang_path));
                messages.extend(overlay);
            }
            Err(_) => println!(
                "cargo:warning=Message file '{}' not found. Falling back to '{}'.",
                lang_path, FALLBACK_LANG
            ),
        }
    }

    // --- 3. Generate the `t!` macro ---
    // Keys are sorted so the generated file is stable between builds.
    let mut entries: Vec<(&String, &String)> = messages.iter().collect();
    entries.sort();

    let mut macro_code = String::from("#[macro_export]\n#[doc(hidden)]\nmacro_rules! t {\n");
    for (key, value) in entries {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!("    (\"{}\") => {{ \"{}\" }};\n", key, escaped));
    }
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing message key: \", $key)) }};\n",
    );
    macro_code.push('}');

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is always set by cargo");
    fs::write(Path::new(&out_dir).join("messages.rs"), macro_code)
        .expect("Failed to write generated messages");
}
