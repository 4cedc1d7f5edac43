//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::debug;
use songdeck::source::player_label;

/// Environment file read from the working directory at startup.
pub const ENV_FILE: &str = ".env";

/// Load `dir/.env` into the process environment when it exists.
///
/// Variables already set in the environment keep their values.
pub fn load_env_file(dir: &Path) -> Result<Option<PathBuf>> {
    let path = dir.join(ENV_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    dotenvy::from_path(&path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!("loaded environment from {}", path.display());
    Ok(Some(path))
}

/// Ask for one playlist per player until an empty line is entered.
///
/// At least one playlist is required; an empty first answer re-prompts.
/// End of input before any playlist is an error.
pub fn prompt_playlists<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>> {
    writeln!(output, "Enter one playlist URL per player. Press Enter on an empty line when done.")?;
    let mut playlists = Vec::new();
    loop {
        write!(output, "{} playlist: ", player_label(playlists.len()))?;
        output.flush()?;
        let mut line = String::new();
        let read = input.read_line(&mut line).context("failed to read playlist")?;
        let answer = line.trim();
        if read == 0 {
            if playlists.is_empty() {
                return Err(anyhow!("no playlists entered"));
            }
            return Ok(playlists);
        }
        if answer.is_empty() {
            if playlists.is_empty() {
                writeln!(output, "At least one playlist is required.")?;
                continue;
            }
            return Ok(playlists);
        }
        playlists.push(answer.to_string());
    }
}

/// Ask for the number of songs per playlist, falling back to `default` on empty input.
pub fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, default: usize) -> Result<usize> {
    loop {
        write!(output, "Songs per playlist [{}]: ", default)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read song count")? == 0 {
            return Ok(default);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<usize>() {
            Ok(count) if count > 0 => return Ok(count),
            _ => writeln!(output, "Please enter a positive number.")?,
        }
    }
}

/// Create the parent directory of `path` when it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    ensure_parent_dir(path)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Duplex printing guidance shown after a deck is written.
pub fn printing_instructions(output: &Path, pages: usize) -> String {
    format!(
        "Wrote {} page(s) to {}\n\
         \n\
         Printing instructions:\n\
         1. Print the odd pages (code sides) at actual size (100%).\n\
         2. Put the printed stack back in the tray, flipped on the long edge.\n\
         3. Print the even pages (track info) onto the backs.\n\
         4. Cut along the dashed guides; corner marks show each card's edges.\n\
         Duplex printers can do steps 1-3 in one pass with long-edge binding.\n",
        pages,
        output.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn prompt_collects_until_blank_line() -> Result<()> {
        let mut input = Cursor::new("https://a\n  https://b  \n\nignored\n");
        let mut output = Vec::new();
        let playlists = prompt_playlists(&mut input, &mut output)?;
        assert_eq!(playlists, vec!["https://a".to_string(), "https://b".to_string()]);
        let transcript = String::from_utf8(output)?;
        assert!(transcript.contains("Player 1 playlist: "));
        assert!(transcript.contains("Player 3 playlist: "));
        Ok(())
    }

    #[test]
    fn prompt_requires_one_playlist() -> Result<()> {
        let mut input = Cursor::new("\nhttps://a\n\n");
        let mut output = Vec::new();
        let playlists = prompt_playlists(&mut input, &mut output)?;
        assert_eq!(playlists, vec!["https://a".to_string()]);
        assert!(String::from_utf8(output)?.contains("At least one playlist is required."));
        Ok(())
    }

    #[test]
    fn prompt_fails_on_eof_without_playlists() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(prompt_playlists(&mut input, &mut output).is_err());
    }

    #[test]
    fn count_prompt_defaults_and_retries() -> Result<()> {
        let mut output = Vec::new();
        assert_eq!(prompt_count(&mut Cursor::new("\n"), &mut output, 10)?, 10);
        assert_eq!(prompt_count(&mut Cursor::new("zero\n0\n7\n"), &mut output, 10)?, 7);
        Ok(())
    }

    #[test]
    fn env_file_is_loaded_when_present() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(load_env_file(dir.path())?, None);

        fs::write(
            dir.path().join(ENV_FILE),
            "# credentials\nSONGDECK_ENV_FILE_CHECK=from-dotenv\n",
        )?;
        assert_eq!(load_env_file(dir.path())?, Some(dir.path().join(ENV_FILE)));
        assert_eq!(std::env::var("SONGDECK_ENV_FILE_CHECK")?, "from-dotenv");
        Ok(())
    }

    #[test]
    fn malformed_env_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(ENV_FILE), "NOT A VALID LINE\n")?;
        assert!(load_env_file(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn write_output_creates_parent_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("out.txt");
        write_output(&path, "hello")?;
        assert_eq!(fs::read_to_string(&path)?, "hello");
        Ok(())
    }
}
