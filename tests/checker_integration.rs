use std::path::{Path, PathBuf};
use tempfile::TempDir;

use selcheck::{CheckerConfig, LocatorConfig, SelectorChecker, SelectorPattern};

fn create_component(dir: &Path, name: &str, selector: &str) -> PathBuf {
    let file_path = dir.join(name);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    let content = format!(
        "import {{ Component }} from \"@angular/core\";\n\n\
         @Component({{\n  selector: \"{selector}\",\n  templateUrl: \"./t.html\",\n}})\n\
         export class TestComponent {{}}\n"
    );
    std::fs::write(&file_path, content).expect("Failed to write component file");
    file_path
}

fn sorted_names(instances: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = instances
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn two_files_sharing_a_selector_form_one_group() {
    let temp_dir = TempDir::new().unwrap();
    create_component(temp_dir.path(), "a.component.ts", "app-test");
    create_component(temp_dir.path(), "b.component.ts", "app-test");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].selector, "app-test");
    assert_eq!(
        sorted_names(&results[0].instances),
        vec!["a.component.ts", "b.component.ts"]
    );
}

#[tokio::test]
async fn instance_paths_are_relative_to_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    create_component(temp_dir.path(), "a.component.ts", "app-test");
    create_component(temp_dir.path(), "b.component.ts", "app-test");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    let cwd = std::env::current_dir().unwrap();
    for instance in &results[0].instances {
        assert!(
            instance.is_relative(),
            "expected relative path, got {}",
            instance.display()
        );
        // Resolving against the working directory lands on a real file.
        assert!(cwd.join(instance).is_file());
    }
}

#[tokio::test]
async fn empty_selector_never_forms_a_group() {
    let temp_dir = TempDir::new().unwrap();
    create_component(temp_dir.path(), "a.component.ts", "");
    create_component(temp_dir.path(), "b.component.ts", "");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn hundred_files_sharing_a_selector_form_one_group() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..100 {
        create_component(
            temp_dir.path(),
            &format!("feature{}/c{i}.component.ts", i % 10),
            "app-everywhere",
        );
    }

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].selector, "app-everywhere");
    assert_eq!(results[0].instances.len(), 100);
    assert_eq!(checker.file_count(temp_dir.path()).await, 100);
}

#[tokio::test]
async fn missing_root_yields_empty_result_without_error() {
    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[PathBuf::from("missing-dir")]).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn duplicates_merge_across_roots_into_one_group() {
    let temp_dir = TempDir::new().unwrap();
    let root_a = temp_dir.path().join("apps");
    let root_b = temp_dir.path().join("libs");
    create_component(&root_a, "header.component.ts", "app-header");
    create_component(&root_b, "header.component.ts", "app-header");
    create_component(&root_b, "footer.component.ts", "app-footer");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[root_a, root_b]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].selector, "app-header");
    assert_eq!(results[0].instances.len(), 2);
}

#[tokio::test]
async fn non_matching_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    create_component(temp_dir.path(), "a.component.ts", "app-test");
    create_component(temp_dir.path(), "b.service.ts", "app-test");
    create_component(temp_dir.path(), "c.component.ts.bak", "app-test");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(checker.file_count(temp_dir.path()).await, 1);
}

#[tokio::test]
async fn custom_suffix_and_pattern_are_honored() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.widget.js"), "register('my-tag')").unwrap();
    std::fs::write(temp_dir.path().join("b.widget.js"), "register('my-tag')").unwrap();
    create_component(temp_dir.path(), "c.component.ts", "my-tag");

    let checker = SelectorChecker::new(CheckerConfig {
        locator: LocatorConfig {
            component_suffix: ".widget.js".to_string(),
            ..LocatorConfig::default()
        },
        selector_pattern: SelectorPattern::new(r"register\('([^']+)'\)").unwrap(),
    });
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].selector, "my-tag");
    assert_eq!(
        sorted_names(&results[0].instances),
        vec!["a.widget.js", "b.widget.js"]
    );
}

#[tokio::test]
async fn duplicate_groups_serialize_for_machine_output() {
    let temp_dir = TempDir::new().unwrap();
    create_component(temp_dir.path(), "a.component.ts", "app-test");
    create_component(temp_dir.path(), "b.component.ts", "app-test");

    let checker = SelectorChecker::with_defaults();
    let results = checker.check(&[temp_dir.path().to_path_buf()]).await.unwrap();

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["selector"], "app-test");
    assert_eq!(json[0]["instances"].as_array().unwrap().len(), 2);
}
