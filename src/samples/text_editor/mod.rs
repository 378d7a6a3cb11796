use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::text::CCursor;
use egui::text_edit::TextEditState;
use egui::text_selection::CCursorRange;
use egui_wgpu::wgpu;
use tracing::{debug, info};

use super::{begin_clear_pass, DesiredSettings, Sample};
use crate::color::{self, CLEAR_COLOR};
use crate::config::AppConfig;
use crate::gpu_context::{GpuContext, RenderTarget};
use crate::Result;

pub mod editor;
pub mod language;
pub mod palette;

use editor::{Highlighter, Selection, TextEditor};
use language::LanguageDefinition;
use palette::PaletteKind;

#[rustfmt::skip]
const PREPROC_IDENTIFIERS: &[(&str, &str)] = &[
    ("NULL", "#define NULL ((void*)0)"),
    ("PM_REMOVE", "#define PM_REMOVE (0x0001)"),
    ("ZeroMemory", "Microsoft's own memory zapper function\n(which is a macro actually)\nvoid ZeroMemory(\n\t[in] PVOID  Destination,\n\t[in] SIZE_T Length\n); "),
    ("DXGI_SWAP_EFFECT_DISCARD", "enum DXGI_SWAP_EFFECT::DXGI_SWAP_EFFECT_DISCARD = 0"),
    ("D3D_FEATURE_LEVEL", "enum D3D_FEATURE_LEVEL"),
    ("D3D_DRIVER_TYPE_HARDWARE", "enum D3D_DRIVER_TYPE::D3D_DRIVER_TYPE_HARDWARE  = ( D3D_DRIVER_TYPE_UNKNOWN + 1 )"),
    ("WINAPI", "#define WINAPI __stdcall"),
    ("D3D11_SDK_VERSION", "#define D3D11_SDK_VERSION (7)"),
    ("assert", " #define assert(expression) (void)(\n    (!!(expression)) ||\n    (_wassert(_CRT_WIDE(#expression), _CRT_WIDE(__FILE__), (unsigned)(__LINE__)), 0)\n )"),
];

#[rustfmt::skip]
const IDENTIFIERS: &[(&str, &str)] = &[
    ("HWND", "typedef HWND_* HWND"),
    ("HRESULT", "typedef long HRESULT"),
    ("LPRESULT", "typedef long* LPRESULT"),
    ("D3D11_RENDER_TARGET_VIEW_DESC", "struct D3D11_RENDER_TARGET_VIEW_DESC"),
    ("DXGI_SWAP_CHAIN_DESC", "struct DXGI_SWAP_CHAIN_DESC"),
    ("MSG", "typedef tagMSG MSG\n * Message structure"),
    ("LRESULT", "typedef LONG_PTR LRESULT"),
    ("WPARAM", "WPARAM"),
    ("LPARAM", "LPARAM"),
    ("UINT", "UINT"),
    ("LPVOID", "LPVOID"),
    ("ID3D11Device", "ID3D11Device"),
    ("ID3D11DeviceContext", "ID3D11DeviceContext"),
    ("ID3D11Buffer", "ID3D11Buffer"),
    ("ID3D10Blob", "ID3D10Blob"),
    ("ID3D11VertexShader", "ID3D11VertexShader"),
    ("ID3D11InputLayout", "ID3D11InputLayout"),
    ("ID3D11PixelShader", "ID3D11PixelShader"),
    ("ID3D11SamplerState", "ID3D11SamplerState"),
    ("ID3D11ShaderResourceView", "ID3D11ShaderResourceView"),
    ("ID3D11RasterizerState", "ID3D11RasterizerState"),
    ("ID3D11BlendState", "ID3D11BlendState"),
    ("ID3D11DepthStencilState", "ID3D11DepthStencilState"),
    ("IDXGISwapChain", "IDXGISwapChain"),
    ("ID3D11RenderTargetView", "ID3D11RenderTargetView"),
    ("ID3D11Texture2D", "ID3D11Texture2D"),
    ("TextEditor", "class TextEditor"),
];

const ERROR_MARKERS: &[(usize, &str)] = &[
    (6, "Example error here:\nInclude file not found: \"TextEditor.h\""),
    (41, "Another example error"),
];

/// Clears the screen and hosts a syntax highlighting editor window in the UI.
pub struct TextEditorSample {
    editor: TextEditor,
    file_to_edit: PathBuf,
    clear_color: [f32; 4],
    show_text_editor: bool,
}

impl TextEditorSample {
    const EDITOR_ID: &'static str = "TextEditor";

    /// Builds the demo editor and loads `file_to_edit` when it exists.
    pub fn new(file_to_edit: &Path) -> Result<Self> {
        let language = LanguageDefinition::cplusplus()?
            .with_preproc_identifiers(PREPROC_IDENTIFIERS.iter().copied())
            .with_identifiers(IDENTIFIERS.iter().copied());
        let mut editor = TextEditor::new(language);
        editor.set_error_markers(
            ERROR_MARKERS
                .iter()
                .map(|(line, message)| (*line, message.to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
        if editor.load_file(file_to_edit) {
            debug!("Loaded {} into the editor", file_to_edit.display());
        }

        Ok(Self {
            editor,
            file_to_edit: file_to_edit.to_path_buf(),
            clear_color: CLEAR_COLOR,
            show_text_editor: false,
        })
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    pub fn set_editor_visible(&mut self, visible: bool) {
        self.show_text_editor = visible;
    }

    pub fn is_editor_visible(&self) -> bool {
        self.show_text_editor
    }

    fn file_name(&self) -> String {
        self.file_to_edit
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Sample for TextEditorSample {
    const NAME: &'static str = "Ming|TextEditor";

    fn desired_settings(_is_initialization: bool) -> DesiredSettings {
        DesiredSettings::HD
    }

    #[tracing::instrument(skip_all)]
    fn init(_ctx: &GpuContext, config: &AppConfig) -> Result<Self> {
        info!("Initializing TextEditor sample");
        Self::new(&config.editor_file())
    }

    #[tracing::instrument(skip_all)]
    fn render(&mut self, ctx: &GpuContext, target: &RenderTarget) -> Result<()> {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("TextEditor Encoder"),
            });
        // The pass only clears color and depth
        drop(begin_clear_pass(
            &mut encoder,
            target,
            color::to_wgpu(self.clear_color),
            "TextEditor Clear Pass",
        ));
        ctx.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn update_ui(&mut self, ui: &egui::Context) {
        egui::Window::new("Settings")
            .default_pos([10.0, 10.0])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.color_edit_button_rgba_unmultiplied(&mut self.clear_color);
                    ui.label("Color");
                });
                ui.checkbox(&mut self.show_text_editor, "Show TextEditor");
                ui.label("hello");
                if ui.button("Test").clicked() {
                    info!("Test");
                }
            });

        if self.show_text_editor {
            let file_name = self.file_name();
            let mut open = true;
            let mut quit = false;
            egui::Window::new("Text Editor Demo")
                .open(&mut open)
                .default_size([800.0, 600.0])
                .hscroll(true)
                .show(ui, |ui| {
                    quit = editor_window(ui, &mut self.editor, &file_name);
                });
            self.show_text_editor = open && !quit;
        }
    }
}

/// Menu bar, status line and editor body. Returns `true` when Quit was picked.
fn editor_window(ui: &mut egui::Ui, editor: &mut TextEditor, file_name: &str) -> bool {
    let mut quit = false;
    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Save").clicked() {
                // Saving is not wired up; the buffer stays in memory only
                debug!(bytes = editor.text().len(), "Save requested");
                ui.close_menu();
            }
            if ui
                .add(egui::Button::new("Quit").shortcut_text("Alt-F4"))
                .clicked()
            {
                quit = true;
                ui.close_menu();
            }
        });
        // The clipboard is read once when the menu opens and dropped when it closes
        let clipboard_id = egui::Id::new("ming_edit_menu_clipboard");
        let edit = ui.menu_button("Edit", |ui| {
            let clipboard = ui.data_mut(|d| {
                d.get_temp_mut_or_insert_with(clipboard_id, clipboard_text)
                    .clone()
            });
            edit_menu(ui, editor, clipboard.as_deref());
        });
        if edit.inner.is_none() {
            ui.data_mut(|d| d.remove::<Option<String>>(clipboard_id));
        }
        ui.menu_button("View", |ui| {
            let current = editor.palette().kind;
            for kind in PaletteKind::ALL {
                if ui.radio(current == kind, kind.label()).clicked() {
                    editor.set_palette(kind);
                    ui.close_menu();
                }
            }
        });
    });

    let (line, column) = editor.cursor_position();
    ui.label(format!(
        "{:>6}/{:<6} {:>6} lines  | {} | {} | {}",
        line + 1,
        column + 1,
        editor.line_count(),
        if editor.can_undo() { "*" } else { " " },
        editor.language().name,
        file_name,
    ));

    editor_body(ui, editor);
    quit
}

fn clipboard_text() -> Option<String> {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Nothing to paste: {e}");
            None
        }
    }
}

fn paste_enabled(read_only: bool, clipboard: Option<&str>) -> bool {
    !read_only && clipboard.is_some_and(|text| !text.is_empty())
}

fn edit_menu(ui: &mut egui::Ui, editor: &mut TextEditor, clipboard: Option<&str>) {
    let mut read_only = editor.is_read_only();
    if ui.checkbox(&mut read_only, "Read-only mode").changed() {
        editor.set_read_only(read_only);
    }
    ui.separator();

    let menu_item = |ui: &mut egui::Ui, enabled: bool, text: &str, shortcut: &str| {
        ui.add_enabled(enabled, egui::Button::new(text).shortcut_text(shortcut))
            .clicked()
    };

    if menu_item(ui, !read_only && editor.can_undo(), "Undo", "ALT-Backspace") {
        editor.undo();
        ui.close_menu();
    }
    if menu_item(ui, !read_only && editor.can_redo(), "Redo", "Ctrl-Y") {
        editor.redo();
        ui.close_menu();
    }
    ui.separator();

    let has_selection = editor.has_selection();
    if menu_item(ui, has_selection, "Copy", "Ctrl-C") {
        if let Some(text) = editor.copy() {
            ui.output_mut(|o| o.copied_text = text);
        }
        ui.close_menu();
    }
    if menu_item(ui, !read_only && has_selection, "Cut", "Ctrl-X") {
        if let Some(text) = editor.cut() {
            ui.output_mut(|o| o.copied_text = text);
        }
        ui.close_menu();
    }
    if menu_item(ui, !read_only && has_selection, "Delete", "Del") {
        editor.delete();
        ui.close_menu();
    }
    if menu_item(ui, paste_enabled(read_only, clipboard), "Paste", "Ctrl-V") {
        if let Some(text) = clipboard {
            editor.paste(text);
        }
        ui.close_menu();
    }
    ui.separator();

    if ui.button("Select all").clicked() {
        editor.select_all();
        ui.close_menu();
    }
}

fn editor_body(ui: &mut egui::Ui, editor: &mut TextEditor) {
    let id = ui.make_persistent_id(TextEditorSample::EDITOR_ID);

    if let Some(selection) = editor.take_pending_selection() {
        let mut state = TextEditState::load(ui.ctx(), id).unwrap_or_default();
        state.cursor.set_char_range(Some(CCursorRange::two(
            CCursor::new(selection.anchor),
            CCursor::new(selection.cursor),
        )));
        state.store(ui.ctx(), id);
    }

    let read_only = editor.is_read_only();
    let font_id = egui::TextStyle::Monospace.resolve(ui.style());
    let (text, highlighter) = editor.widget_parts();

    let output = ui
        .scope(|ui| {
            *ui.visuals_mut() = body_visuals(highlighter);
            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                let job = highlighter.layout_job(text, font_id.clone(), wrap_width);
                ui.fonts(|fonts| fonts.layout_job(job))
            };
            egui::ScrollArea::vertical()
                .show(ui, |ui| {
                    if read_only {
                        let mut view = text.as_str();
                        code_edit(&mut view, id, &mut layouter).show(ui)
                    } else {
                        code_edit(text, id, &mut layouter).show(ui)
                    }
                })
                .inner
        })
        .inner;

    if let Some(range) = output.cursor_range {
        let range = range.as_ccursor_range();
        editor.sync_selection(Selection {
            anchor: range.secondary.index,
            cursor: range.primary.index,
        });
    }

    if let Some(pointer) = output.response.hover_pos() {
        let cursor = output.galley.cursor_from_pos(pointer - output.galley_pos);
        if let Some(hover) = editor.hover_text(cursor.ccursor.index) {
            output.response.on_hover_text_at_pointer(hover);
        }
    }

    editor.feed_undo(ui.input(|i| i.time));
}

/// Dark or light widget visuals to match the palette, with the palette's background behind the text.
fn body_visuals(highlighter: &Highlighter) -> egui::Visuals {
    let mut visuals = if highlighter.dark_mode() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.extreme_bg_color = highlighter.background();
    visuals
}

fn code_edit<'t>(
    buffer: &'t mut dyn egui::TextBuffer,
    id: egui::Id,
    layouter: &'t mut dyn FnMut(&egui::Ui, &str, f32) -> Arc<egui::Galley>,
) -> egui::TextEdit<'t> {
    egui::TextEdit::multiline(buffer)
        .id(id)
        .code_editor()
        .desired_width(f32::INFINITY)
        .desired_rows(30)
        .layouter(layouter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ming-text-editor-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_leaves_editor_empty() {
        let sample = TextEditorSample::new(Path::new("/definitely/not/here.wgsl")).unwrap();
        assert_eq!(sample.editor().text(), "");
        assert_eq!(sample.editor().line_count(), 1);
    }

    #[test]
    fn existing_file_is_loaded_verbatim() {
        let contents = "#include \"TextEditor.h\"\r\nint main() {\n\treturn 0;\n}\n";
        let path = temp_file("exact.cpp", contents);
        let sample = TextEditorSample::new(&path).unwrap();
        assert_eq!(sample.editor().text(), contents);
        assert_eq!(sample.file_name(), "exact.cpp");
    }

    #[test]
    fn toggling_visibility_keeps_content() {
        let path = temp_file("toggle.cpp", "int x;\n");
        let mut sample = TextEditorSample::new(&path).unwrap();
        assert!(!sample.is_editor_visible());
        sample.set_editor_visible(true);
        sample.set_editor_visible(false);
        sample.set_editor_visible(true);
        assert!(sample.is_editor_visible());
        assert_eq!(sample.editor().text(), "int x;\n");
    }

    #[test]
    fn demo_language_and_markers() {
        let sample = TextEditorSample::new(Path::new("/definitely/not/here.wgsl")).unwrap();
        let editor = sample.editor();
        assert_eq!(editor.language().name, "C++");
        assert_eq!(editor.language().declaration("TextEditor"), Some("class TextEditor"));
        assert_eq!(
            editor.language().declaration("NULL"),
            Some("#define NULL ((void*)0)")
        );
        assert_eq!(
            editor.error_marker(6),
            Some("Example error here:\nInclude file not found: \"TextEditor.h\"")
        );
        assert_eq!(editor.error_marker(41), Some("Another example error"));
        assert_eq!(editor.error_marker(7), None);
    }

    #[test]
    fn paste_needs_writable_editor_and_clipboard_text() {
        assert!(paste_enabled(false, Some("int x;")));
        assert!(!paste_enabled(true, Some("int x;")));
        assert!(!paste_enabled(false, None));
        assert!(!paste_enabled(false, Some("")));
    }

    #[test]
    fn body_visuals_follow_palette() {
        let mut sample = TextEditorSample::new(Path::new("/definitely/not/here.wgsl")).unwrap();
        let visuals = body_visuals(sample.editor.widget_parts().1);
        assert!(visuals.dark_mode);
        assert_eq!(visuals.extreme_bg_color, egui::Color32::from_rgb(0x10, 0x10, 0x10));

        sample.editor.set_palette(PaletteKind::Light);
        let visuals = body_visuals(sample.editor.widget_parts().1);
        assert!(!visuals.dark_mode);
        assert_eq!(visuals.extreme_bg_color, egui::Color32::WHITE);
    }

    #[test]
    fn starts_with_default_clear_color() {
        let sample = TextEditorSample::new(Path::new("/definitely/not/here.wgsl")).unwrap();
        assert_eq!(sample.clear_color, CLEAR_COLOR);
        assert_eq!(TextEditorSample::NAME, "Ming|TextEditor");
        assert_eq!(
            TextEditorSample::desired_settings(true),
            DesiredSettings::HD
        );
    }
}
