//! Project templates used by "new project".

use super::Project;
use crate::error::TreeError;

const SAMPLE_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Hello, webpad</title>
  <link rel="stylesheet" href="./style.css">
</head>
<body>
  <h1>Hello, webpad</h1>
  <p>Edit the files on the left to see your changes here.</p>
  <button id="greet">Say hello</button>
  <script src="./script.js"></script>
</body>
</html>
"#;

const SAMPLE_STYLE: &str = r#"body {
  font-family: system-ui, sans-serif;
  margin: 2rem;
}

h1 {
  color: #3b82f6;
}
"#;

const SAMPLE_SCRIPT: &str = r#"console.log("Hello from script.js");

document.getElementById("greet").addEventListener("click", function () {
  console.info("Button clicked at", new Date().toISOString());
});
"#;

const BLANK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title></title>
</head>
<body>
</body>
</html>
"#;

/// A project with a single empty `index.html` entry document
pub fn blank_project(name: &str) -> Result<Project, TreeError> {
    let mut project = Project::new(name);
    let root = project.root_id.clone();
    let index = project.create_file(&root, "index.html")?;
    project.update_file_content(&index, BLANK_INDEX)?;
    Ok(project)
}

/// The sample project: an entry document wired to a stylesheet and a script
pub fn sample_project(name: &str) -> Result<Project, TreeError> {
    let mut project = Project::new(name);
    let root = project.root_id.clone();
    for (file_name, content) in [
        ("index.html", SAMPLE_INDEX),
        ("style.css", SAMPLE_STYLE),
        ("script.js", SAMPLE_SCRIPT),
    ] {
        let id = project.create_file(&root, file_name)?;
        project.update_file_content(&id, content)?;
    }
    Ok(project)
}
