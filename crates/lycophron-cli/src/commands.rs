use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crossterm::style::Stylize;
use lycophron_core::{CORE_FIELDS, Error as CoreError, FieldCatalog, TemplateRequest};
use lycophron_deposit::{
    DryRunClient, PublishTask, Record, RecordStatus, StatusUpdate, Storage, TaskRunner,
    spawn_worker,
};
use uuid::Uuid;

use crate::CliError;
use crate::csv_io;
use crate::workspace::{
    JsonRecordStore, ProjectPaths, load_or_create_settings, load_settings, save_settings,
};

pub fn init(paths: &ProjectPaths, name: Option<&str>, token: Option<String>) -> Result<(), CliError> {
    let paths = match name {
        Some(name) => ProjectPaths::new(paths.root.join(name)),
        None => paths.clone(),
    };
    paths.ensure_dirs()?;

    let project_name = name
        .map(str::to_string)
        .unwrap_or_else(|| paths.default_name());
    let mut settings = load_or_create_settings(&paths, &project_name)?;
    if let Some(token) = token {
        settings.token = Some(token);
        save_settings(&paths, &settings)?;
    }

    tracing::info!(event = "project_initialized", root = %paths.root.display(), name = %settings.name);
    println!(
        "{}",
        format!("Project initialized in directory {}.", paths.root.display()).green()
    );
    Ok(())
}

pub fn configure(
    paths: &ProjectPaths,
    token: Option<String>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let mut settings = load_settings(paths)?;

    if token.is_none() && api_url.is_none() {
        let token_state = if settings.token.is_some() { "set" } else { "not set" };
        println!("name:    {}", settings.name);
        println!("api_url: {}", settings.api_url);
        println!("token:   {token_state}");
        return Ok(());
    }

    if let Some(token) = token {
        settings.token = Some(token);
    }
    if let Some(api_url) = api_url {
        settings.api_url = api_url;
    }
    save_settings(paths, &settings)?;

    tracing::info!(event = "settings_updated", api_url = %settings.api_url);
    println!("{}", "Configuration updated.".green());
    Ok(())
}

pub fn load(paths: &ProjectPaths, input: &Path) -> Result<(), CliError> {
    paths.require_initialized()?;

    let table = csv_io::read_table(input)?;
    let catalog = FieldCatalog::builtin();
    let report = catalog.check_headers(&table.headers);
    if !report.is_ok() {
        print_invalid_headers(&report.invalid);
        return Err(CoreError::InvalidHeaders(report.invalid).into());
    }

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| Record::from_row(idx + 1, &table.headers, row))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.id.as_str()) {
            tracing::warn!(event = "duplicate_record_id", id = %record.id);
        }
    }

    let mut store = JsonRecordStore::open(&paths.records_path())?;
    let previous = store.records()?;
    for record in previous
        .iter()
        .filter(|existing| existing.status == RecordStatus::Published)
    {
        if seen.contains(record.id.as_str()) {
            tracing::warn!(event = "published_record_replaced", id = %record.id);
        }
    }

    let count = store.upsert(records)?;
    tracing::info!(event = "records_loaded", path = %input.display(), count = count);
    println!(
        "{}",
        format!("Loaded {count} record(s) from {}.", input.display()).green()
    );
    Ok(())
}

pub fn export(paths: &ProjectPaths, output: &Path) -> Result<(), CliError> {
    paths.require_initialized()?;

    let store = JsonRecordStore::open(&paths.records_path())?;
    let records = store.records()?;
    let columns = export_columns(&FieldCatalog::builtin(), &records);
    let bytes = csv_io::write_records(output, &columns, &records)?;

    tracing::info!(event = "records_exported", path = %output.display(), count = records.len(), bytes = bytes);
    println!(
        "{}",
        format!("Exported {} record(s) to {}.", records.len(), output.display()).green()
    );
    Ok(())
}

/// Core columns, then used catalog columns in template order, then any
/// other stored columns by name.
fn export_columns(catalog: &FieldCatalog<'_>, records: &[Record]) -> Vec<String> {
    let used: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.metadata.keys().map(String::as_str))
        .collect();

    let mut columns: Vec<String> = CORE_FIELDS.iter().map(|field| field.to_string()).collect();
    columns.extend(
        catalog
            .all_fields()
            .into_iter()
            .filter(|field| used.contains(field.as_str())),
    );
    columns.extend(
        used.iter()
            .filter(|key| !catalog.is_valid_header(key))
            .map(|key| key.to_string()),
    );
    columns
}

pub async fn publish(paths: &ProjectPaths, limit: Option<usize>) -> Result<(), CliError> {
    let settings = load_settings(paths)?;
    settings.validate()?;

    let mut store = JsonRecordStore::open(&paths.records_path())?;
    let pending = store.pending(limit)?;
    if pending.is_empty() {
        println!("No records to publish.");
        return Ok(());
    }

    let run_id = Uuid::new_v4().to_string();
    tracing::info!(
        event = "publish_started",
        run_id = %run_id,
        records = pending.len(),
        api_url = %settings.api_url
    );

    let worker = spawn_worker(
        DryRunClient::new(settings.api_url.clone()),
        settings.worker_queue_capacity,
    );
    store.apply_updates(
        pending
            .iter()
            .map(|record| StatusUpdate::new(record.id.clone(), RecordStatus::Queued))
            .collect(),
    )?;
    for record in pending {
        let id = record.id.clone();
        if let Err(err) = worker.submit(PublishTask { record }).await {
            store.update_status(&id, RecordStatus::Failed, None, Some(err.to_string()))?;
            return Err(err.into());
        }
    }

    let outcomes = worker.finish().await?;
    let mut published = 0;
    let mut failed = 0;
    let mut updates = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(receipt) => {
                published += 1;
                updates.push(StatusUpdate::published(outcome.record_id, receipt.remote_id));
            }
            Err(message) => {
                failed += 1;
                eprintln!("{}", format!("- {}: {message}", outcome.record_id).red());
                updates.push(StatusUpdate::failed(outcome.record_id, message));
            }
        }
    }
    store.apply_updates(updates)?;

    tracing::info!(
        event = "publish_finished",
        run_id = %run_id,
        published = published,
        failed = failed
    );
    println!("{}", format!("Published {published} record(s).").green());

    if failed > 0 {
        return Err(CliError::PublishFailed(failed));
    }
    Ok(())
}

pub fn new_template(request: &TemplateRequest, strict: bool, filename: &Path) -> Result<(), CliError> {
    let catalog = FieldCatalog::builtin();

    if strict {
        catalog.ensure_known_namespaces(request)?;
    } else if !request.include_all {
        let unknown = catalog.unknown_namespaces(&request.custom_namespaces);
        if !unknown.is_empty() {
            tracing::warn!(event = "unknown_namespaces", namespaces = %unknown.join(","));
            eprintln!(
                "{}",
                format!("Skipping unknown namespace(s): {}", unknown.join(", ")).yellow()
            );
        }
    }

    let headers = catalog.build_header_set(request);
    csv_io::write_template(filename, &headers)?;

    tracing::info!(event = "template_written", path = %filename.display(), columns = headers.len());
    println!(
        "{}",
        format!(
            "Template with {} column(s) written to {}.",
            headers.len(),
            filename.display()
        )
        .green()
    );
    Ok(())
}

pub fn validate(paths: &ProjectPaths, file: &Path) -> Result<(), CliError> {
    if paths.is_initialized() {
        load_settings(paths)?.validate()?;
        println!("{}", "App validation passed.".green());
    } else {
        println!(
            "No project found in {}; skipping configuration validation.",
            paths.root.display()
        );
    }

    let headers = csv_io::read_headers(file)?;
    let report = FieldCatalog::builtin().check_headers(&headers);
    if !report.is_ok() {
        print_invalid_headers(&report.invalid);
        return Err(CoreError::InvalidHeaders(report.invalid).into());
    }

    tracing::info!(event = "headers_validated", path = %file.display(), columns = headers.len());
    println!("{}", "CSV header validation passed.".green());
    Ok(())
}

pub fn list_namespaces() {
    let catalog = FieldCatalog::builtin();
    for namespace in catalog.namespaces() {
        println!(
            "{:<12} {:<12} {} field(s)",
            namespace.id,
            namespace.prefix,
            namespace.fields.len()
        );
    }
}

fn print_invalid_headers(invalid: &[String]) {
    println!("{}", "CSV header validation failed. Invalid headers found:".red());
    for header in invalid {
        println!("{}", format!("- {header}").red());
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use lycophron_deposit::DepositError;

    use super::*;

    fn project() -> (tempfile::TempDir, ProjectPaths) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().join("project"));
        init(&paths, None, Some("token".to_string())).expect("init project");
        (dir, paths)
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).expect("write csv");
        path
    }

    #[test]
    fn init_with_name_creates_subdirectory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = ProjectPaths::new(dir.path().to_path_buf());
        init(&base, Some("survey"), None).expect("init");

        let project = ProjectPaths::new(dir.path().join("survey"));
        assert!(project.is_initialized());
        let settings = load_settings(&project).expect("settings");
        assert_eq!(settings.name, "survey");
        assert_eq!(settings.token, None);
    }

    #[test]
    fn configure_updates_settings() {
        let (_dir, paths) = project();
        configure(&paths, None, Some("https://example.org/api".to_string())).expect("configure");
        let settings = load_settings(&paths).expect("settings");
        assert_eq!(settings.api_url, "https://example.org/api");
        assert_eq!(settings.token.as_deref(), Some("token"));
    }

    #[test]
    fn commands_require_a_project() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        let csv = write_csv(dir.path(), "in.csv", "id\nr1\n");
        assert!(load(&paths, &csv).is_err());
        assert!(export(&paths, &dir.path().join("out.csv")).is_err());
    }

    #[test]
    fn new_template_writes_requested_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        let request = TemplateRequest::default().with_custom_list("obo,bogus");

        new_template(&request, false, &path).expect("write template");

        let headers = csv_io::read_headers(&path).expect("headers");
        assert_eq!(headers, FieldCatalog::builtin().build_header_set(&request));
        assert_eq!(headers.last().map(String::as_str), Some("obo.RO_0002453"));
    }

    #[test]
    fn strict_template_rejects_unknown_namespace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        let request = TemplateRequest::default().with_custom_list("bogus");

        let err = new_template(&request, true, &path).expect_err("unknown namespace");
        assert!(matches!(err, CliError::Core(CoreError::UnknownNamespace(_))));
        assert!(!path.exists());
    }

    #[test]
    fn validate_fails_on_unknown_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().join("no-project"));
        let good = write_csv(dir.path(), "good.csv", "id,filenames,title\n");
        let bad = write_csv(dir.path(), "bad.csv", "id,colour,title,size\n");

        validate(&paths, &good).expect("valid headers");
        match validate(&paths, &bad) {
            Err(CliError::Core(CoreError::InvalidHeaders(invalid))) => {
                assert_eq!(invalid, vec!["colour", "size"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_does_not_trim_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().join("no-project"));
        let padded = write_csv(dir.path(), "padded.csv", "id, title \nr1,T\n");

        match validate(&paths, &padded) {
            Err(CliError::Core(CoreError::InvalidHeaders(invalid))) => {
                assert_eq!(invalid, vec![" title "]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_checks_project_configuration() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().join("project"));
        init(&paths, None, None).expect("init without token");
        let good = write_csv(dir.path(), "good.csv", "id\n");

        assert!(matches!(
            validate(&paths, &good),
            Err(CliError::Workspace(_))
        ));
    }

    #[test]
    fn load_then_export_round_trips_records() {
        let (dir, paths) = project();
        let input = write_csv(
            dir.path(),
            "in.csv",
            "id,filenames,dwc.kingdom,title\nr2,\"b.pdf\nc.pdf\",Plantae,Second\nr1,a.pdf,,First\n",
        );

        load(&paths, &input).expect("load");
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        assert_eq!(store.len(), 2);

        let output = dir.path().join("out.csv");
        export(&paths, &output).expect("export");
        let content = std::fs::read_to_string(&output).expect("read export");
        assert_eq!(
            content,
            "id,filenames,title,dwc.kingdom\nr1,a.pdf,First,\nr2,\"b.pdf\nc.pdf\",Second,Plantae\n"
        );
    }

    #[test]
    fn load_rejects_invalid_headers_without_writing() {
        let (dir, paths) = project();
        let input = write_csv(dir.path(), "in.csv", "id,colour\nr1,red\n");

        assert!(load(&paths, &input).is_err());
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn load_rejects_padded_headers() {
        let (dir, paths) = project();
        let input = write_csv(dir.path(), "in.csv", "id, title\nr1,One\n");

        assert!(matches!(
            load(&paths, &input),
            Err(CliError::Core(CoreError::InvalidHeaders(_)))
        ));
    }

    #[test]
    fn load_rejects_repeated_columns_without_writing() {
        let (dir, paths) = project();
        let input = write_csv(
            dir.path(),
            "in.csv",
            "id,subjects.subject,subjects.subject\nr1,Botany,Zoology\n",
        );

        let err = load(&paths, &input).expect_err("repeated column");
        assert!(matches!(
            err,
            CliError::Deposit(DepositError::DuplicateColumn(ref column)) if column == "subjects.subject"
        ));
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn load_rejects_rows_without_id() {
        let (dir, paths) = project();
        let input = write_csv(dir.path(), "in.csv", "id,title\nr1,One\n,Two\n");

        let err = load(&paths, &input).expect_err("missing id");
        assert_eq!(err.to_string(), "row 2 has no id");
    }

    #[tokio::test]
    async fn publish_marks_records_published() {
        let (dir, paths) = project();
        let input = write_csv(dir.path(), "in.csv", "id,title\nr1,One\nr2,Two\nr3,Three\n");
        load(&paths, &input).expect("load");

        publish(&paths, Some(2)).await.expect("publish two");
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        let statuses: Vec<RecordStatus> = store
            .records()
            .expect("records")
            .iter()
            .map(|record| record.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                RecordStatus::Published,
                RecordStatus::Published,
                RecordStatus::New
            ]
        );

        publish(&paths, None).await.expect("publish rest");
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        assert!(store.pending(None).expect("pending").is_empty());
    }

    #[tokio::test]
    async fn publish_resumes_records_left_queued() {
        let (dir, paths) = project();
        let input = write_csv(dir.path(), "in.csv", "id,title\nr1,One\nr2,Two\n");
        load(&paths, &input).expect("load");

        let mut store = JsonRecordStore::open(&paths.records_path()).expect("store");
        store
            .update_status("r1", RecordStatus::Queued, None, None)
            .expect("queue r1");

        publish(&paths, None).await.expect("publish");
        let store = JsonRecordStore::open(&paths.records_path()).expect("store");
        let records = store.records().expect("records");
        assert!(
            records
                .iter()
                .all(|record| record.status == RecordStatus::Published)
        );
    }

    #[tokio::test]
    async fn publish_requires_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ProjectPaths::new(dir.path().to_path_buf());
        init(&paths, None, None).expect("init");

        let err = publish(&paths, None).await.expect_err("missing token");
        assert!(matches!(err, CliError::Workspace(_)));
    }

    #[test]
    fn export_orders_unknown_columns_last() {
        let mut record = Record::new("r1");
        record.metadata.insert("zz.extra".to_string(), "x".to_string());
        record.metadata.insert("title".to_string(), "T".to_string());
        record.metadata.insert("access.files".to_string(), "public".to_string());

        let columns = export_columns(&FieldCatalog::builtin(), &[record]);
        assert_eq!(
            columns,
            vec!["id", "filenames", "title", "access.files", "zz.extra"]
        );
    }
}
