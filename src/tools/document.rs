use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::llm::Generator;
use crate::strategy::prompts;
use crate::strategy::reply::{download_marker, DOWNLOAD_CLOSE, DOWNLOAD_OPEN, HEADERS_TO_STRIP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Excel,
    Word,
    Pdf,
}

impl FileType {
    /// Keyword scan of the lowercased query; PDF when nothing matches.
    pub fn detect(query: &str) -> Self {
        let q = query.to_lowercase();
        if ["excel", "spreadsheet", "csv"].iter().any(|k| q.contains(k)) {
            FileType::Excel
        } else if ["word", "docx"].iter().any(|k| q.contains(k)) {
            FileType::Word
        } else {
            FileType::Pdf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Excel => "EXCEL",
            FileType::Word => "WORD",
            FileType::Pdf => "PDF",
        }
    }

    /// What the renderer actually writes for this type.
    pub fn output_format(&self) -> &'static str {
        match self {
            FileType::Excel => "CSV",
            FileType::Word | FileType::Pdf => "Markdown",
        }
    }

    /// Path reported when rendering fails. The file never exists.
    pub fn error_path(&self) -> String {
        match self {
            FileType::Excel => "Error_Generating_EXCEL.csv".to_string(),
            FileType::Word => "Error_Generating_WORD.md".to_string(),
            FileType::Pdf => "Error_Generating_PDF.md".to_string(),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marked-up prose block recognised in generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    Bullet(String),
    Paragraph(String),
}

pub fn parse_blocks(content: &str) -> Vec<Block> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(title) = line.strip_prefix("# ") {
                Block::Title(title.trim().to_string())
            } else if line.starts_with("##") {
                Block::Heading(line.replace("### ", "").replace("## ", "").trim().to_string())
            } else if let Some(item) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
                Block::Bullet(item.trim().to_string())
            } else {
                Block::Paragraph(line.to_string())
            }
        })
        .collect()
}

/// Comma-separated rows, cells trimmed.
pub fn parse_rows(content: &str) -> Vec<Vec<String>> {
    content
        .trim()
        .lines()
        .map(|row| row.split(',').map(|c| c.trim().to_string()).collect())
        .collect()
}

/// Fold typographic characters to plain ASCII equivalents.
pub fn sanitize_text(text: &str) -> String {
    const REPLACEMENTS: &[(char, &str)] = &[
        ('\u{2018}', "'"),
        ('\u{2019}', "'"),
        ('\u{201c}', "\""),
        ('\u{201d}', "\""),
        ('\u{2013}', "-"),
        ('\u{2014}', "--"),
        ('\u{2026}', "..."),
        ('\u{2022}', "*"),
    ];

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

/// Turns generated text into a file on disk.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, file_type: FileType, content: &str) -> Result<PathBuf>;
}

/// Writes CSV sheets and normalized Markdown documents into a data directory.
pub struct FsRenderer {
    dir: PathBuf,
}

impl FsRenderer {
    pub fn new(dir: &Path) -> Result<Self> {
        let shown = dir.display().to_string();
        // The path must survive reply parsing intact
        let breaks_marker = shown.contains('\n')
            || [DOWNLOAD_OPEN, DOWNLOAD_CLOSE]
                .iter()
                .chain(HEADERS_TO_STRIP)
                .any(|token| shown.contains(token));
        if breaks_marker {
            bail!("data directory {:?} cannot be used in a download marker", shown);
        }
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", shown))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn file_name(prefix: &str, ext: &str) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_{}.{}", prefix, &id[..8], ext)
    }

    fn write_sheet(&self, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(Self::file_name("sheet", "csv"));
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .context("Failed to open sheet for writing")?;
        for row in parse_rows(content) {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(path)
    }

    fn write_document(&self, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(Self::file_name("doc", "md"));
        let mut out = String::new();
        let mut in_list = false;

        for block in parse_blocks(&sanitize_text(content)) {
            if in_list && !matches!(block, Block::Bullet(_)) {
                out.push('\n');
            }
            in_list = matches!(block, Block::Bullet(_));
            match block {
                Block::Title(t) => out.push_str(&format!("# {}\n\n", t)),
                Block::Heading(h) => out.push_str(&format!("## {}\n\n", h)),
                Block::Bullet(b) => out.push_str(&format!("- {}\n", b)),
                Block::Paragraph(p) => out.push_str(&format!("{}\n\n", p)),
            }
        }

        fs::write(&path, out).context("Failed to write document")?;
        Ok(path)
    }
}

impl DocumentRenderer for FsRenderer {
    fn render(&self, file_type: FileType, content: &str) -> Result<PathBuf> {
        match file_type {
            FileType::Excel => self.write_sheet(content),
            FileType::Word | FileType::Pdf => self.write_document(content),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub file_type: FileType,
    pub content: String,
    pub path: String,
}

impl GeneratedDocument {
    /// Confirmation sentence carrying the download marker.
    pub fn confirmation(&self) -> String {
        format!(
            "I have generated your {} document ({}).\n\n{}",
            self.file_type,
            self.file_type.output_format(),
            download_marker(&self.path)
        )
    }
}

/// Single-shot generation followed by rendering.
pub struct DocumentTool {
    llm: Arc<dyn Generator>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl DocumentTool {
    pub fn new(llm: Arc<dyn Generator>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { llm, renderer }
    }

    /// Generation errors propagate; rendering errors fall back to the error-marker path.
    pub async fn generate(&self, model: &str, query: &str) -> Result<GeneratedDocument> {
        let file_type = FileType::detect(query);
        info!(%file_type, query, "Generating document");

        let prompt = format!("{}{}", prompts::document_instruction(file_type), query);
        let content = self.llm.complete(model, &prompt).await?;

        let path = match self.renderer.render(file_type, &content) {
            Ok(path) => path.display().to_string(),
            Err(e) => {
                warn!(%file_type, "Document rendering failed: {:#}", e);
                file_type.error_path()
            }
        };

        Ok(GeneratedDocument {
            file_type,
            content,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testing::{FailingRenderer, ScriptedGenerator};

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::detect("Please save this as an excel file"), FileType::Excel);
        assert_eq!(FileType::detect("export a CSV of prices"), FileType::Excel);
        assert_eq!(FileType::detect("a spreadsheet please"), FileType::Excel);
        assert_eq!(FileType::detect("write a Word doc"), FileType::Word);
        assert_eq!(FileType::detect("report.docx"), FileType::Word);
        assert_eq!(FileType::detect("save as pdf"), FileType::Pdf);
        assert_eq!(FileType::detect("make me a file"), FileType::Pdf);
        // excel wins over word
        assert_eq!(FileType::detect("word and excel"), FileType::Excel);
    }

    #[test]
    fn test_parse_blocks() {
        let blocks = parse_blocks("# Title\n\n## Section\n### Sub\n* one\n- two\nplain text");
        assert_eq!(
            blocks,
            vec![
                Block::Title("Title".into()),
                Block::Heading("Section".into()),
                Block::Heading("Sub".into()),
                Block::Bullet("one".into()),
                Block::Bullet("two".into()),
                Block::Paragraph("plain text".into()),
            ]
        );
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows("Fruit, Color\nApple, Red\nBanana,Yellow\n");
        assert_eq!(
            rows,
            vec![
                vec!["Fruit", "Color"],
                vec!["Apple", "Red"],
                vec!["Banana", "Yellow"],
            ]
        );
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(
            sanitize_text("\u{201c}Hi\u{201d} \u{2014} it\u{2019}s\u{2026} \u{2022}"),
            "\"Hi\" -- it's... *"
        );
    }

    #[test]
    fn test_fs_renderer_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FsRenderer::new(dir.path()).unwrap();
        let path = renderer
            .render(FileType::Excel, "Name, Qty\nApple, 3\nPear, 1, ripe")
            .unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("sheet_"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Name,Qty\nApple,3\nPear,1,ripe\n");
    }

    #[test]
    fn test_fs_renderer_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FsRenderer::new(dir.path()).unwrap();
        let path = renderer
            .render(FileType::Pdf, "# Report\n* a\n* b\nDone \u{2014} ok")
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# Report\n\n- a\n- b\n\nDone -- ok\n\n");
    }

    #[test]
    fn test_renderer_rejects_marker_breaking_dir() {
        assert!(FsRenderer::new(Path::new("data]]evil")).is_err());
        assert!(FsRenderer::new(Path::new("./my---data")).is_err());
        assert!(FsRenderer::new(Path::new("exports/Answer:")).is_err());
    }

    #[test]
    fn test_confirmation_survives_reply_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("exports-2024");
        FsRenderer::new(&data_dir).unwrap();

        let path = data_dir.join("doc_0a1b2c3d.md").display().to_string();
        let doc = GeneratedDocument {
            file_type: FileType::Pdf,
            content: "# Brief".to_string(),
            path: path.clone(),
        };
        let parsed = crate::strategy::reply::parse_reply(&doc.confirmation());
        assert_eq!(parsed.file_path.as_deref(), Some(path.as_str()));
        assert_eq!(parsed.answer.trim(), "I have generated your PDF document (Markdown).");
    }

    #[tokio::test]
    async fn test_generate_uses_type_prompt_and_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new("Fruit\nApple\nMango", "unused"));
        let tool = DocumentTool::new(llm.clone(), Arc::new(FsRenderer::new(dir.path()).unwrap()));

        let doc = tool.generate("large", "list fruits in a spreadsheet").await.unwrap();
        assert_eq!(doc.file_type, FileType::Excel);
        assert!(Path::new(&doc.path).exists());

        let (model, prompt) = llm.prompts().remove(0);
        assert_eq!(model, "large");
        assert!(prompt.starts_with("You are a Data Generator."));
        assert!(prompt.ends_with("list fruits in a spreadsheet"));
        assert!(doc
            .confirmation()
            .starts_with("I have generated your EXCEL document (CSV).\n\n[[DOWNLOAD:"));
    }

    #[tokio::test]
    async fn test_render_failure_reports_error_marker_path() {
        let llm = Arc::new(ScriptedGenerator::new("# T", "unused"));
        let tool = DocumentTool::new(llm, Arc::new(FailingRenderer));

        let doc = tool.generate("large", "summary as word").await.unwrap();
        assert_eq!(doc.path, "Error_Generating_WORD.md");
        assert!(!Path::new(&doc.path).exists());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let tool = DocumentTool::new(Arc::new(ScriptedGenerator::failing()), Arc::new(FailingRenderer));
        assert!(tool.generate("large", "pdf please").await.is_err());
    }
}
