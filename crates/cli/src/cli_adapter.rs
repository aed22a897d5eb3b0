use std::path::Path;
use std::sync::Arc;

use catalog_core::domain::attachment::Attachment;
use catalog_core::domain::record::{Record, RecordDraft, RecordPatch};
use catalog_core::ports::catalog_service::CatalogService;
use catalog_core::ports::command_handler::{Command, CommandError, CommandHandler};
use error_stack::{report, ResultExt};
use tracing::{info, instrument};

use crate::args::{Commands, UpdateFields};
use crate::render;

pub struct CliAdapter {
    catalog_service: Arc<dyn CatalogService>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("catalog_service", &"<CatalogService>")
            .finish()
    }
}

fn execution_failed(details: &str) -> CommandError {
    CommandError::ExecutionFailed {
        details: details.to_string(),
    }
}

impl From<UpdateFields> for RecordPatch {
    fn from(fields: UpdateFields) -> Self {
        let file_link = match (fields.file_link, fields.clear_file_link) {
            (_, true) => Some(None),
            (Some(link), false) => Some(Some(link)),
            (None, false) => None,
        };
        RecordPatch {
            title: fields.title,
            category: fields.category,
            tags: fields.tags,
            rating: fields.rating,
            review: fields.review,
            file_link,
        }
    }
}

impl CliAdapter {
    pub fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self { catalog_service }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, command: Commands) -> error_stack::Result<String, CommandError> {
        let command = Self::parse_command(command);
        self.handle(command).await
    }

    fn parse_command(command: Commands) -> Command {
        match command {
            Commands::Add {
                title,
                category,
                tags,
                rating,
                review,
                file,
            } => Command::Add {
                draft: RecordDraft::new(title, category, rating)
                    .with_tags(tags)
                    .with_review(review),
                attachment: file,
            },
            Commands::List { search } => Command::List { search },
            Commands::Update { id, fields } => Command::Update {
                id,
                patch: fields.into(),
            },
            Commands::Delete { id } => Command::Delete { id },
            Commands::Export { output } => Command::Export { output },
            Commands::Replace { input, yes } => Command::Replace {
                input,
                confirmed: yes,
            },
            Commands::AssignIds => Command::AssignIds,
            Commands::Health => Command::HealthCheck,
        }
    }

    async fn read_export(path: &Path) -> error_stack::Result<Vec<Record>, CommandError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .change_context(execution_failed("Failed to read the export file"))
            .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

        serde_json::from_str(&content)
            .change_context(CommandError::InvalidCommand {
                details: "Input is not a valid record export".to_string(),
            })
            .attach_printable_lazy(|| format!("Path: {}", path.display()))
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::Add { draft, attachment } => {
                let attachment = match attachment {
                    Some(path) => Some(
                        Attachment::from_path(&path)
                            .await
                            .change_context(CommandError::InvalidCommand {
                                details: format!("Cannot read attachment {}", path.display()),
                            })?,
                    ),
                    None => None,
                };

                let added = self
                    .catalog_service
                    .add_record(draft, attachment)
                    .await
                    .change_context(execution_failed("Failed to add record"))?;

                let mut output = format!("✅ Added record\n{}", render::record_details(&added.record));
                if added.skipped_upload {
                    output.push_str("\nAttachment not uploaded: rating is below the upload threshold");
                }
                Ok(output)
            }
            Command::List { search } => {
                let records = match search.as_deref() {
                    Some(query) => self.catalog_service.search_records(query).await,
                    None => self.catalog_service.list_records().await,
                }
                .change_context(execution_failed("Failed to list records"))?;

                Ok(render::records_table(&records))
            }
            Command::Update { id, patch } => {
                let record = self
                    .catalog_service
                    .update_record(id, patch)
                    .await
                    .change_context(execution_failed("Failed to update record"))?;

                Ok(format!("✅ Updated record\n{}", render::record_details(&record)))
            }
            Command::Delete { id } => {
                let record = self
                    .catalog_service
                    .delete_record(id)
                    .await
                    .change_context(execution_failed("Failed to delete record"))?;

                let mut output = format!("✅ Deleted {:?} ({})", record.title, id);
                if let Some(link) = &record.file_link {
                    output.push_str(&format!("\nIts uploaded file was kept: {}", link));
                }
                Ok(output)
            }
            Command::Export { output } => {
                let records = self
                    .catalog_service
                    .list_records()
                    .await
                    .change_context(execution_failed("Failed to read records"))?;
                let json = serde_json::to_string_pretty(&records)
                    .change_context(execution_failed("Failed to serialize records"))?;

                match output {
                    Some(path) => {
                        tokio::fs::write(&path, json)
                            .await
                            .change_context(execution_failed("Failed to write export"))
                            .attach_printable_lazy(|| format!("Path: {}", path.display()))?;
                        Ok(format!(
                            "✅ Exported {} records to {}",
                            records.len(),
                            path.display()
                        ))
                    }
                    None => Ok(json),
                }
            }
            Command::Replace { input, confirmed } => {
                if !confirmed {
                    return Err(report!(CommandError::InvalidCommand {
                        details: "Replacing overwrites the whole catalogue; pass --yes to confirm"
                            .to_string(),
                    }));
                }

                let records = Self::read_export(&input).await?;
                let count = records.len();
                info!("Replacing catalogue with {} records", count);

                self.catalog_service
                    .replace_all(records)
                    .await
                    .change_context(execution_failed("Failed to replace records"))?;

                Ok(format!("✅ Replaced catalogue with {} records", count))
            }
            Command::AssignIds => {
                let assigned = self
                    .catalog_service
                    .assign_missing_ids()
                    .await
                    .change_context(execution_failed("Failed to assign ids"))?;

                Ok(format!("✅ Assigned ids to {} records", assigned))
            }
            Command::HealthCheck => self
                .catalog_service
                .health_check()
                .await
                .change_context(execution_failed("Health check failed")),
        }
    }
}
