use std::path::{Path, PathBuf};

use clap::Parser;
use eframe::egui;

use thread_kaizen::config::KaizenConfig;
use thread_kaizen::thread::page::PageError;

mod app;
mod ui;

use app::ViewerApp;

/// Viewer for a saved comment thread page, with annotation and reply popups
#[derive(Parser, Debug)]
#[command(name = "thread-kaizen", version, about)]
struct Args {
    /// Saved HTML of the article page
    page: PathBuf,

    /// Address the page was saved from (the author is read from its path)
    url: String,

    /// Further comment pages, appended one at a time with "Load more"
    more: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let app = match load_app(&args) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Thread Kaizen",
        options,
        Box::new(|cc| {
            // Load Japanese font (Hiragino Sans on macOS, Noto CJK elsewhere)
            let mut fonts = egui::FontDefinitions::default();
            let font_paths = [
                "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
                "/System/Library/Fonts/HiraginoSans-W3.otf",
                "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            ];
            for path in &font_paths {
                if let Ok(data) = std::fs::read(path) {
                    fonts
                        .font_data
                        .insert("japanese".to_owned(), egui::FontData::from_owned(data));
                    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                        if let Some(list) = fonts.families.get_mut(&family) {
                            list.push("japanese".to_owned());
                        }
                    }
                    break;
                }
            }
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(app))
        }),
    )
    .expect("Failed to start Thread Kaizen");
}

fn load_app(args: &Args) -> Result<ViewerApp, PageError> {
    let page_html = read_file(&args.page)?;
    let more = args
        .more
        .iter()
        .map(|path| read_file(path))
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("loaded {} ({} more pages queued)", args.page.display(), more.len());
    ViewerApp::new(&page_html, &args.url, more, KaizenConfig::default())
}

fn read_file(path: &Path) -> Result<String, PageError> {
    std::fs::read_to_string(path).map_err(|e| PageError {
        message: format!("{}: {}", path.display(), e),
        phase: "read",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_url_and_extra_pages() {
        let args = Args::try_parse_from([
            "thread-kaizen",
            "item.html",
            "https://qiita.com/alice/items/0123abcd",
            "page2.html",
            "page3.html",
        ])
        .unwrap();
        assert_eq!(args.page, PathBuf::from("item.html"));
        assert_eq!(args.url, "https://qiita.com/alice/items/0123abcd");
        assert_eq!(args.more, vec![PathBuf::from("page2.html"), PathBuf::from("page3.html")]);
    }

    #[test]
    fn url_is_required() {
        assert!(Args::try_parse_from(["thread-kaizen", "item.html"]).is_err());
    }

    #[test]
    fn missing_file_reports_read_phase() {
        let err = read_file(Path::new("/nonexistent/thread.html")).unwrap_err();
        assert_eq!(err.phase, "read");
        assert!(err.message.contains("/nonexistent/thread.html"));
    }
}
