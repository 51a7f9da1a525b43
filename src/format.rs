// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Positional rendering of message templates.
//!
//! Templates use `{}` for the next argument and `{N}` for the argument at index `N`. Use `{{`
//! and `}}` for literal braces. A template logged without arguments is emitted verbatim.

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;

use crate::Error;
use crate::ErrorKind;
use crate::Trap;

/// Appended to a template that could not be rendered with its arguments.
pub const MALFORMED_MARKER: &str = "[malformed log message]";

/// Render `template` with `args`.
///
/// This never fails: when the template does not match its arguments, the template is returned
/// followed by [`MALFORMED_MARKER`] and a [`ErrorKind::Format`] error is sent to `trap`.
pub fn render<'a>(
    template: &'a str,
    args: &[&dyn fmt::Display],
    trap: &dyn Trap,
) -> Cow<'a, str> {
    if args.is_empty() {
        return Cow::Borrowed(template);
    }

    match try_render(template, args) {
        Ok(message) => Cow::Owned(message),
        Err(err) => {
            trap.trap(&err.with_context("template", template));
            Cow::Owned(format!("{template} {MALFORMED_MARKER}"))
        }
    }
}

/// Render `template` with `args`, failing on any mismatch.
pub fn try_render(template: &str, args: &[&dyn fmt::Display]) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut next = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut spec = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => spec.push(c),
                        None => {
                            return Err(Error::new(ErrorKind::Format, "unclosed placeholder")
                                .with_context("position", pos));
                        }
                    }
                }

                let index = if spec.is_empty() {
                    next += 1;
                    next - 1
                } else {
                    spec.trim().parse::<usize>().map_err(|_| {
                        Error::new(ErrorKind::Format, "placeholder is not a positional index")
                            .with_context("placeholder", format!("{{{spec}}}"))
                    })?
                };

                let arg = args.get(index).ok_or_else(|| {
                    Error::new(ErrorKind::Format, "missing argument for placeholder")
                        .with_context("index", index)
                        .with_context("args", args.len())
                })?;
                write!(out, "{arg}").map_err(|err| {
                    Error::new(ErrorKind::Format, "argument failed to display").with_source(err)
                })?;
            }
            '}' => {
                return Err(Error::new(ErrorKind::Format, "unmatched closing brace")
                    .with_context("position", pos));
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
