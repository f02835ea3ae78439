use super::*;

use std::fmt::Write as _;

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Builds a [`Dom`] from markup.
///
/// Handles elements, quoted, unquoted and bare attributes, text, comments,
/// `<!...>` declarations, and the usual character references. Script and
/// style bodies are kept as text. An `<option>` or `<optgroup>` start tag
/// closes an open `<option>`, and `<optgroup>` also closes an open
/// `<optgroup>`. End tags with no open element are ignored.
pub(crate) fn parse_html(markup: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut open = vec![dom.root];
    let mut cursor = Cursor::new(markup);

    while !cursor.at_end() {
        if cursor.eat("<!--") {
            cursor
                .take_through("-->")
                .ok_or_else(|| Error::HtmlParse("unclosed comment".into()))?;
        } else if cursor.eat("</") {
            let name = end_tag(&mut cursor)?;
            if let Some(position) = open.iter().rposition(|node| dom.is_tag(*node, &name)) {
                open.truncate(position);
            }
        } else if cursor.eat("<!") {
            cursor
                .take_through(">")
                .ok_or_else(|| Error::HtmlParse("unclosed declaration".into()))?;
        } else if cursor.at_start_tag() {
            let tag = start_tag(&mut cursor)?;
            close_implied(&dom, &mut open, &tag.name);

            let parent = open.last().copied().unwrap_or(dom.root);
            let node = dom.create_element(Some(parent), tag.name.clone(), tag.attrs);

            if RAW_TEXT_TAGS.contains(&tag.name.as_str()) && !tag.self_closing {
                let body = cursor
                    .take_raw_text(&tag.name)
                    .ok_or_else(|| Error::HtmlParse(format!("unclosed <{}>", tag.name)))?;
                if !body.is_empty() {
                    dom.create_text(Some(node), body.to_string());
                }
                cursor.eat("</");
                end_tag(&mut cursor)?;
            } else if !tag.self_closing && !VOID_TAGS.contains(&tag.name.as_str()) {
                open.push(node);
            }
        } else {
            let text = decode_entities(cursor.take_text());
            let parent = open.last().copied().unwrap_or(dom.root);
            dom.create_text(Some(parent), text);
        }
    }

    Ok(dom)
}

struct StartTag {
    name: String,
    attrs: HashMap<String, String>,
    self_closing: bool,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn at_start_tag(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().is_some_and(|ch| ch.is_ascii_alphabetic())
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            return true;
        }
        false
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|ch: char| !keep(ch)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Returns the text before `terminator` and moves past the terminator.
    fn take_through(&mut self, terminator: &str) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(terminator)?;
        self.pos += len + terminator.len();
        Some(&rest[..len])
    }

    /// Text up to the next `<`. Always consumes at least one character.
    fn take_text(&mut self) -> &'a str {
        let rest = self.rest();
        let first = rest.chars().next().map_or(0, char::len_utf8);
        let len = rest[first..].find('<').map_or(rest.len(), |at| at + first);
        self.pos += len;
        &rest[..len]
    }

    /// Body of a raw text element, up to (not including) its end tag.
    fn take_raw_text(&mut self, tag: &str) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.to_ascii_lowercase().find(&format!("</{tag}"))?;
        self.pos += len;
        Some(&rest[..len])
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn start_tag(cursor: &mut Cursor<'_>) -> Result<StartTag> {
    cursor.eat("<");
    let name = cursor.take_while(is_name_char).to_ascii_lowercase();
    let mut attrs = HashMap::new();

    loop {
        cursor.skip_whitespace();
        if cursor.at_end() {
            return Err(Error::HtmlParse(format!("unclosed start tag <{name}")));
        }
        if cursor.eat(">") {
            return Ok(StartTag {
                name,
                attrs,
                self_closing: false,
            });
        }
        if cursor.eat("/>") {
            return Ok(StartTag {
                name,
                attrs,
                self_closing: true,
            });
        }

        let attr = cursor.take_while(|ch| {
            !ch.is_whitespace() && !matches!(ch, '/' | '>' | '=' | '"' | '\'')
        });
        if attr.is_empty() {
            // Stray character such as a lone `/` or quote.
            cursor.pos += cursor.rest().chars().next().map_or(0, char::len_utf8);
            continue;
        }
        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            attr_value(cursor)?
        } else {
            String::new()
        };
        attrs.entry(attr.to_ascii_lowercase()).or_insert(value);
    }
}

fn attr_value(cursor: &mut Cursor<'_>) -> Result<String> {
    for quote in ["\"", "'"] {
        if cursor.eat(quote) {
            let raw = cursor
                .take_through(quote)
                .ok_or_else(|| Error::HtmlParse("unclosed quoted attribute value".into()))?;
            return Ok(decode_entities(raw));
        }
    }
    let raw = cursor.take_while(|ch| !ch.is_whitespace() && ch != '>');
    Ok(decode_entities(raw))
}

/// Reads the rest of an end tag after `</` and returns its lowercased name.
fn end_tag(cursor: &mut Cursor<'_>) -> Result<String> {
    cursor.skip_whitespace();
    let name = cursor.take_while(is_name_char).to_ascii_lowercase();
    cursor
        .take_through(">")
        .ok_or_else(|| Error::HtmlParse(format!("unclosed end tag </{name}")))?;
    Ok(name)
}

fn close_implied(dom: &Dom, open: &mut Vec<NodeId>, tag: &str) {
    let top_is = |open: &[NodeId], name: &str| {
        open.len() > 1 && open.last().is_some_and(|node| dom.is_tag(*node, name))
    };
    if matches!(tag, "option" | "optgroup") && top_is(open.as_slice(), "option") {
        open.pop();
    }
    if tag == "optgroup" && top_is(open.as_slice(), "optgroup") {
        open.pop();
    }
}

fn decode_entities(text: &str) -> String {
    let mut pieces = text.split('&');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let decoded = piece
            .split_once(';')
            .and_then(|(name, tail)| entity(name).map(|ch| (ch, tail)));
        match decoded {
            Some((ch, tail)) => {
                out.push(ch);
                out.push_str(tail);
            }
            None => {
                out.push('&');
                out.push_str(piece);
            }
        }
    }
    out
}

fn entity(name: &str) -> Option<char> {
    let named = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        _ => {
            let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => name.strip_prefix('#')?.parse::<u32>().ok()?,
            };
            return char::from_u32(code);
        }
    };
    Some(named)
}

/// Escapes text for element content or a double-quoted attribute value.
pub(crate) fn escape_html(text: &str) -> String {
    text.chars().fold(String::with_capacity(text.len()), |mut out, ch| {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
        out
    })
}

/// Writes `node` as markup. Attributes come out sorted by name so the output
/// is stable.
pub(crate) fn serialize_node(dom: &Dom, node: NodeId, out: &mut String) {
    match &dom.nodes[node.0].node_type {
        NodeType::Document => {
            for child in dom.children(node) {
                serialize_node(dom, *child, out);
            }
        }
        NodeType::Text(text) => {
            let in_raw_text = dom
                .parent(node)
                .and_then(|parent| dom.tag_name(parent))
                .is_some_and(|tag| RAW_TEXT_TAGS.contains(&tag));
            if in_raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape_html(text));
            }
        }
        NodeType::Element(element) => {
            let mut attrs = element.attrs.iter().collect::<Vec<_>>();
            attrs.sort();
            let _ = write!(out, "<{}", element.tag_name);
            for (name, value) in attrs {
                let _ = write!(out, " {name}=\"{}\"", escape_html(value));
            }
            out.push('>');
            if VOID_TAGS.contains(&element.tag_name.as_str()) {
                return;
            }
            for child in dom.children(node) {
                serialize_node(dom, *child, out);
            }
            let _ = write!(out, "</{}>", element.tag_name);
        }
    }
}
