use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use url::Url;
use webrank::handlers::*;

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com");
    assert_eq!(result, Some("https://example.com".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("example.com");
    assert_eq!(result, Some("http://example.com".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    let result = parse_url_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_load_seeds_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://en.wikipedia.org/wiki/Information_science")?;
    writeln!(temp_file, "example.org")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "https://en.wikipedia.org/wiki/Public_university")?;

    let path = PathBuf::from(temp_file.path());
    let seeds = load_seeds_from_file(&path)?;

    assert_eq!(seeds.len(), 3);
    assert_eq!(seeds[0], "https://en.wikipedia.org/wiki/Information_science");
    assert_eq!(seeds[1], "http://example.org");
    assert_eq!(seeds[2], "https://en.wikipedia.org/wiki/Public_university");

    Ok(())
}

#[test]
fn test_load_seeds_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_seeds_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_seeds_from_source_single_url() {
    let url = Url::parse("https://example.com").unwrap();
    let result = load_seeds_from_source(Some(&url), None).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0], "https://example.com/");
}

#[test]
fn test_load_seeds_from_source_no_input() {
    let result = load_seeds_from_source(None, None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either --url or --seeds-file must be provided")
    );
}
