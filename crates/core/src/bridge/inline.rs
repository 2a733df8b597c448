use crate::{config::TrackerConfig, events::Envelope};

/// Envelopes to embed in the current response, in the order they were emitted.
#[derive(Debug, Default)]
pub struct InlineSink {
    envelopes: Vec<Envelope>,
}

impl InlineSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.envelopes.push(envelope);
    }

    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    pub fn into_output(self, config: &TrackerConfig) -> InlineOutput {
        let script = render_script(&self.envelopes, config);
        InlineOutput {
            envelopes: self.envelopes,
            script,
        }
    }
}

/// What the late flush point hands back to the page renderer.
#[derive(Debug, Default)]
pub struct InlineOutput {
    pub envelopes: Vec<Envelope>,
    /// `<script>` fragment, empty when nothing was emitted.
    pub script: String,
}

/// Renders the queue pushes for `envelopes` as one `<script>` block.
///
/// Each envelope becomes a reset marker immediately followed by its event.
/// One-shot kinds are wrapped in a page-scoped token check and only mark the
/// token after the push went through.
pub fn render_script(envelopes: &[Envelope], config: &TrackerConfig) -> String {
    if envelopes.is_empty() {
        return String::new();
    }
    let q = &config.data_layer_name;
    let mut output = String::new();

    output.push_str("<script>\n");
    output.push_str(&format!("window.{q} = window.{q} || [];\n"));

    for envelope in envelopes {
        let message = match envelope.message_json() {
            Ok(json) => escape_for_script(&json),
            Err(e) => {
                tracing::warn!(
                    event = %envelope.kind(),
                    error = %e,
                    "failed to encode envelope, skipping"
                );
                continue;
            }
        };

        if envelope.kind().is_one_shot() {
            let token = format!("{}{}", config.dedup_key_prefix, envelope.kind());
            output.push_str("window.cartbeaconTokens = window.cartbeaconTokens || {};\n");
            output.push_str(&format!("if (!window.cartbeaconTokens[\"{token}\"]) {{\n"));
            output.push_str("  try {\n");
            output.push_str(&format!("    {q}.push({{ecommerce: null}});\n"));
            output.push_str(&format!("    {q}.push({message});\n"));
            output.push_str(&format!("    window.cartbeaconTokens[\"{token}\"] = true;\n"));
            output.push_str("  } catch (e) {}\n");
            output.push_str("}\n");
        } else {
            output.push_str(&format!("{q}.push({{ecommerce: null}});\n"));
            output.push_str(&format!("{q}.push({message});\n"));
        }
    }

    output.push_str("</script>\n");
    output
}

/// `<` only occurs inside JSON strings, where `\u003c` decodes to the same text
/// and cannot open `</script>` or `<!--` for the HTML parser.
fn escape_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}
