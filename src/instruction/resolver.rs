//! Parsing and serialising viewport instructions.

use crate::config::SeparatorConfig;
use crate::error::{RouterError, RouterResult};
use crate::instruction::viewport_instruction::ViewportInstruction;

/// Converts between instruction strings and `ViewportInstruction` trees.
#[derive(Debug, Clone, Default)]
pub struct InstructionResolver {
    separators: SeparatorConfig,
}

impl InstructionResolver {
    pub fn new(separators: SeparatorConfig) -> Self {
        Self { separators }
    }

    pub fn separators(&self) -> &SeparatorConfig {
        &self.separators
    }

    pub fn clear_viewport_instruction(&self) -> ViewportInstruction {
        ViewportInstruction::clear()
    }

    /// Detect the clear prefix. Returns whether viewports not named by the
    /// remaining path should be emptied, and that remaining path.
    pub fn should_clear_viewports(&self, path: &str) -> (bool, String) {
        let clear = &self.separators.clear;
        let clear_and_add = format!("{clear}{}", self.separators.add);
        if path == clear.as_str() {
            (true, String::new())
        } else if let Some(rest) = path.strip_prefix(clear_and_add.as_str()) {
            (true, rest.to_string())
        } else {
            (false, path.to_string())
        }
    }

    /// Parse a path such as `a@left/b+c(1)@right` into sibling instructions.
    pub fn parse_viewport_instructions(&self, path: &str) -> RouterResult<Vec<ViewportInstruction>> {
        let path = path.strip_prefix(self.separators.scope.as_str()).unwrap_or(path);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        self.split_top_level(path, &self.separators.sibling, false)?
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(|part| self.parse_viewport_instruction(part))
            .collect()
    }

    /// Parse one instruction with its child instructions.
    pub fn parse_viewport_instruction(&self, instruction: &str) -> RouterResult<ViewportInstruction> {
        let invalid = || RouterError::InvalidInstruction(instruction.to_string());
        let parts = self.split_top_level(instruction, &self.separators.scope, true)?;
        let head = parts.first().copied().unwrap_or_default();
        if head.is_empty() {
            return Err(invalid());
        }

        let mut vi = self.parse_head(head).ok_or_else(invalid)?;
        if let Some(rest) = parts.get(1).filter(|r| !r.is_empty()) {
            vi.next_scope_instructions = match self.strip_group(rest) {
                Some(group) => self.parse_viewport_instructions(group)?,
                None => vec![self.parse_viewport_instruction(rest)?],
            };
        }
        Ok(vi)
    }

    /// Serialise one instruction (and its children).
    pub fn stringify_viewport_instruction(&self, vi: &ViewportInstruction, exclude_viewport: bool) -> String {
        let s = &self.separators;
        let mut out = self.stringify_component(vi);
        if !exclude_viewport {
            if let Some(name) = vi.target_name() {
                out.push_str(&s.viewport);
                out.push_str(name);
            }
        }
        match vi.next_scope_instructions.as_slice() {
            [] => {}
            [child] => {
                out.push_str(&s.scope);
                out.push_str(&self.stringify_viewport_instruction(child, exclude_viewport));
            }
            children => {
                out.push_str(&s.scope);
                out.push_str(&s.parameters);
                out.push_str(&self.join(children, exclude_viewport));
                out.push_str(&s.parameters_end);
            }
        }
        out
    }

    pub fn stringify_viewport_instructions(&self, instructions: &[ViewportInstruction]) -> String {
        self.join(instructions, false)
    }

    /// `component(parameters)`, or the clear marker for an empty instruction.
    pub fn stringify_component(&self, vi: &ViewportInstruction) -> String {
        let s = &self.separators;
        let mut out = vi.component_name.clone().unwrap_or_else(|| s.clear.clone());
        if let Some(parameters) = vi.parameters.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(&s.parameters);
            out.push_str(parameters);
            out.push_str(&s.parameters_end);
        }
        out
    }

    /// Prefix a relative link with the scope it was followed from.
    pub fn build_scoped_link(&self, scope_context: &str, href: &str) -> String {
        let scope = &self.separators.scope;
        if scope_context.is_empty() {
            format!("{scope}{href}")
        } else {
            format!("{scope}{scope_context}{scope}{href}")
        }
    }

    fn join(&self, instructions: &[ViewportInstruction], exclude_viewport: bool) -> String {
        instructions
            .iter()
            .map(|vi| self.stringify_viewport_instruction(vi, exclude_viewport))
            .collect::<Vec<_>>()
            .join(&self.separators.sibling)
    }

    /// `component(parameters)@viewport` without children.
    fn parse_head(&self, head: &str) -> Option<ViewportInstruction> {
        let s = &self.separators;
        let parts = self.split_top_level(head, &s.viewport, true).ok()?;
        let component = parts.first().copied().unwrap_or_default();
        let viewport_name = parts.get(1).filter(|v| !v.is_empty()).map(|v| v.to_string());

        let (name, parameters) = match self.brackets().and_then(|(open, close)| Some((component.find(open)?, open, close))) {
            Some((at, open, close)) => {
                let inner = component[at + open.len()..].strip_suffix(close)?;
                (&component[..at], Some(inner.to_string()).filter(|p| !p.is_empty()))
            }
            None => (component, None),
        };
        if name.is_empty() {
            return None;
        }

        Some(ViewportInstruction {
            component_name: (name != s.clear).then(|| name.to_string()),
            parameters,
            viewport_name,
            ..Default::default()
        })
    }

    /// Parameter brackets, `None` when either is configured empty.
    fn brackets(&self) -> Option<(&str, &str)> {
        let s = &self.separators;
        (!s.parameters.is_empty() && !s.parameters_end.is_empty()).then(|| (s.parameters.as_str(), s.parameters_end.as_str()))
    }

    /// Inner text of `(…)` when the parentheses enclose the whole input.
    fn strip_group<'a>(&self, input: &'a str) -> Option<&'a str> {
        let (open, close) = self.brackets()?;
        if !input.starts_with(open) {
            return None;
        }
        let mut depth = 0usize;
        let mut i = 0;
        while i < input.len() {
            let rest = &input[i..];
            if rest.starts_with(open) {
                depth += 1;
                i += open.len();
            } else if rest.starts_with(close) {
                depth = depth.checked_sub(1)?;
                i += close.len();
                if depth == 0 {
                    // `(a)+(b)` is not one group.
                    return (i == input.len()).then(|| &input[open.len()..i - close.len()]);
                }
            } else {
                i += rest.chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
        None
    }

    /// Split on `separator` outside parentheses. With `first_only`, splits at
    /// most once.
    fn split_top_level<'a>(&self, input: &'a str, separator: &str, first_only: bool) -> RouterResult<Vec<&'a str>> {
        if separator.is_empty() {
            return Ok(vec![input]);
        }
        // Without both brackets nothing nests.
        let brackets = self.brackets();

        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        let mut i = 0;
        while i < input.len() {
            let rest = &input[i..];
            if let Some((open, _)) = brackets.filter(|(open, _)| rest.starts_with(open)) {
                depth += 1;
                i += open.len();
            } else if let Some((_, close)) = brackets.filter(|(_, close)| rest.starts_with(close)) {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| RouterError::InvalidInstruction(input.to_string()))?;
                i += close.len();
            } else if depth == 0 && rest.starts_with(separator) {
                parts.push(&input[start..i]);
                i += separator.len();
                start = i;
                if first_only {
                    parts.push(&input[start..]);
                    return Ok(parts);
                }
            } else {
                i += rest.chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
        if depth != 0 {
            return Err(RouterError::InvalidInstruction(input.to_string()));
        }
        parts.push(&input[start..]);
        Ok(parts)
    }
}
