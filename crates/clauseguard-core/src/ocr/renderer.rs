use crate::error::ClauseError;
use crate::tool::{run_tool, Deadline};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Renders PDF pages to PNG with pdftoppm (from poppler-utils).
#[derive(Debug, Clone)]
pub struct PageRenderer {
    binary: PathBuf,
    dpi: u32,
}

impl PageRenderer {
    pub fn new(binary: PathBuf, dpi: u32) -> Self {
        Self { binary, dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Render one page (1-based) of `pdf_path` into `out_dir`, returning the
    /// PNG path.
    pub fn render_page(
        &self,
        pdf_path: &Path,
        page_number: usize,
        out_dir: &Path,
        deadline: &Deadline,
    ) -> Result<PathBuf, ClauseError> {
        let prefix = out_dir.join(format!("page_{page_number:04}"));
        let page = page_number.to_string();

        // -singlefile writes exactly `<prefix>.png` instead of a zero-padded
        // page suffix whose width depends on the page count.
        let args: Vec<OsString> = vec![
            "-png".into(),
            "-singlefile".into(),
            "-r".into(),
            self.dpi.to_string().into(),
            "-f".into(),
            page.clone().into(),
            "-l".into(),
            page.into(),
            pdf_path.into(),
            prefix.clone().into(),
        ];
        let output = run_tool(&self.binary, args, deadline, "pdftoppm")?;

        if !output.status.success() {
            let stderr = output.stderr_lossy();
            if stderr.to_lowercase().contains("incorrect password") {
                return Err(ClauseError::PasswordProtected);
            }
            return Err(ClauseError::ToolFailed {
                tool: self.binary.display().to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            return Err(ClauseError::ToolFailed {
                tool: self.binary.display().to_string(),
                code: 0,
                stderr: format!("expected rendered image not found: {}", image_path.display()),
            });
        }

        Ok(image_path)
    }
}
