use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::level::{Level, LevelError};

/// Error type for level collection loading.
#[derive(Debug, Error)]
pub enum LevelsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("level {number}: {source}")]
    InvalidLevel {
        /// 1-indexed position in the collection.
        number: usize,
        #[source]
        source: LevelError,
    },
}

/// A collection of Sokoban levels in XSB format.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Level>,
}

impl Levels {
    /// Parse XSB-formatted levels from a string.
    ///
    /// Lines starting with `;` are comments and end the current level, as do
    /// blank lines.
    pub fn from_text(contents: &str) -> Result<Self, LevelsError> {
        let mut levels = Vec::new();
        let mut current = String::new();

        for line in contents.lines() {
            if line.trim_start().starts_with(';') || line.trim().is_empty() {
                Self::flush(&mut current, &mut levels)?;
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
        Self::flush(&mut current, &mut levels)?;

        Ok(Levels { levels })
    }

    fn flush(current: &mut String, levels: &mut Vec<Level>) -> Result<(), LevelsError> {
        if current.is_empty() {
            return Ok(());
        }
        let level = Level::parse(current).map_err(|source| LevelsError::InvalidLevel {
            number: levels.len() + 1,
            source,
        })?;
        levels.push(level);
        current.clear();
        Ok(())
    }

    /// Parse XSB-formatted levels from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_basic() {
        let level1 = "####\n\
                      #. #\n\
                      #$ #\n\
                      #@ #\n\
                      ####";

        let level2 = "######\n\
                      #.   #\n\
                      # $  #\n\
                      #  @ #\n\
                      ######";

        let level3 = "  ####
###  ####
#     $ #
# #  #$ #
# . .#@ #
#########";

        let xsb_content = format!(
            "; 1\n\n{}\n\n; 2\n\n{}\n\n; 3\n\n{}\n",
            level1, level2, level3
        );

        let levels = Levels::from_text(&xsb_content).unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels.get(0).unwrap().to_string().trim_end(), level1);
        assert_eq!(levels.get(1).unwrap().to_string().trim_end(), level2);
        assert_eq!(levels.get(2).unwrap().to_string().trim_end(), level3);
        assert!(levels.get(3).is_none());
    }

    #[test]
    fn test_from_text_without_separators() {
        let xsb_content = "####\n#. #\n#$ #\n#@ #\n####\n\n####\n#* #\n#@ #\n####";
        let levels = Levels::from_text(xsb_content).unwrap();
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn test_from_text_invalid_level() {
        let xsb_content = "; 1

####
#. #
#$ #
#@ #
####

; 2

####
#.$#
####
";

        let result = Levels::from_text(xsb_content);
        match result {
            Err(LevelsError::InvalidLevel { number, source }) => {
                assert_eq!(number, 2);
                assert_eq!(source, LevelError::MissingPlayer);
            }
            other => panic!("expected invalid level error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_text_empty() {
        let levels = Levels::from_text("; nothing here\n\n").unwrap();
        assert!(levels.is_empty());
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.xsb");
        assert!(matches!(result.unwrap_err(), LevelsError::Io(_)));
    }
}
