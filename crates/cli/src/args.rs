use std::path::PathBuf;

use catalog_core::domain::record::{Category, Rating, RecordId};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Personal media catalogue kept in a spreadsheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a record, optionally uploading an attachment
    Add {
        #[arg(long)]
        title: String,

        /// Novel, ASMR, AV, Doujin, Anime or Manga
        #[arg(long)]
        category: Category,

        /// Space separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// 0 to 10 in steps of 0.5
        #[arg(long, default_value_t = Rating::DEFAULT)]
        rating: Rating,

        #[arg(long, default_value = "")]
        review: String,

        /// File uploaded when the rating reaches the upload threshold
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List records
    #[command(alias = "ls")]
    List {
        /// Only show records containing this text in any column
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Change fields of one record
    Update {
        id: RecordId,

        #[command(flatten)]
        fields: UpdateFields,
    },

    /// Delete one record
    #[command(alias = "rm")]
    Delete { id: RecordId },

    /// Write every record as JSON
    Export {
        /// Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Overwrite the whole catalogue from a JSON export
    Replace {
        #[arg(short, long)]
        input: PathBuf,

        /// Confirm the overwrite
        #[arg(long)]
        yes: bool,
    },

    /// Give an id to every record that lacks one
    AssignIds,

    /// Check configuration, credentials and worksheet access
    Health,
}

#[derive(Args, Debug)]
pub struct UpdateFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub category: Option<Category>,

    #[arg(long)]
    pub tags: Option<String>,

    #[arg(long)]
    pub rating: Option<Rating>,

    #[arg(long)]
    pub review: Option<String>,

    #[arg(long, conflicts_with = "clear_file_link")]
    pub file_link: Option<String>,

    #[arg(long)]
    pub clear_file_link: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_defaults() {
        let cli = Cli::try_parse_from(["catalog", "add", "--title", "X", "--category", "AV"])
            .unwrap();
        match cli.command {
            Commands::Add {
                title,
                category,
                rating,
                file,
                ..
            } => {
                assert_eq!(title, "X");
                assert_eq!(category, Category::Av);
                assert_eq!(rating, Rating::DEFAULT);
                assert!(file.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_invalid_rating() {
        assert!(Cli::try_parse_from([
            "catalog",
            "add",
            "--title",
            "X",
            "--category",
            "AV",
            "--rating",
            "7.3"
        ])
        .is_err());
    }

    #[test]
    fn test_file_link_conflicts_with_clear() {
        let id = RecordId::generate().to_string();
        assert!(Cli::try_parse_from([
            "catalog",
            "update",
            id.as_str(),
            "--file-link",
            "https://example.com/a",
            "--clear-file-link"
        ])
        .is_err());
    }
}
