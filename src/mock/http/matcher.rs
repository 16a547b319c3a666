/*
 * Copyright 2026 Registry Mock Team
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::mock::http::operations::Operation;
use regex::Regex;
use std::collections::HashMap;

pub enum Dispatch<'a> {
    Matched {
        operation: &'a Operation,
        params: HashMap<String, String>,
    },
    /// The path is declared, but not for this method.
    MethodNotAllowed(Vec<String>),
    NotFound,
}

struct Route {
    operation: Operation,
    pattern: Regex,
    param_names: Vec<String>,
}

pub struct OperationMatcher {
    routes: Vec<Route>,
}

impl OperationMatcher {
    pub fn new(mut operations: Vec<Operation>) -> Self {
        // Templated paths lose to static ones; longer paths win ties.
        operations.sort_by(|a, b| {
            let a_score = Self::path_specificity_score(&a.path);
            let b_score = Self::path_specificity_score(&b.path);

            if a_score != b_score {
                b_score.cmp(&a_score)
            } else {
                b.path.len().cmp(&a.path.len())
            }
        });

        let routes = operations
            .into_iter()
            .filter_map(|operation| {
                let normalized = normalize_path(&operation.path);
                let pattern = Self::compile_path_pattern(&normalized)?;
                let param_names = Self::extract_param_names(&normalized);
                Some(Route {
                    operation,
                    pattern,
                    param_names,
                })
            })
            .collect();

        Self { routes }
    }

    fn path_specificity_score(path: &str) -> u32 {
        if path.contains('{') {
            1
        } else {
            2
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn dispatch(&self, method: &str, path: &str) -> Dispatch<'_> {
        let normalized = normalize_path(path);
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(&normalized) else {
                continue;
            };
            if !route.operation.method.eq_ignore_ascii_case(method) {
                allowed.push(route.operation.method.clone());
                continue;
            }

            let params = route
                .param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    captures
                        .get(i + 1)
                        .map(|value| (name.clone(), value.as_str().to_string()))
                })
                .collect();
            return Dispatch::Matched {
                operation: &route.operation,
                params,
            };
        }

        if allowed.is_empty() {
            Dispatch::NotFound
        } else {
            allowed.sort();
            allowed.dedup();
            Dispatch::MethodNotAllowed(allowed)
        }
    }

    fn compile_path_pattern(path: &str) -> Option<Regex> {
        let mut pattern = String::new();
        let mut literal = String::new();
        let mut in_param = false;

        for c in path.chars() {
            match c {
                '{' if !in_param => {
                    pattern.push_str(&regex::escape(&literal));
                    literal.clear();
                    in_param = true;
                }
                '}' if in_param => {
                    pattern.push_str("([^/]+)");
                    in_param = false;
                }
                _ if in_param => {}
                _ => literal.push(c),
            }
        }
        pattern.push_str(&regex::escape(&literal));

        Regex::new(&format!("^{}$", pattern)).ok()
    }

    fn extract_param_names(path: &str) -> Vec<String> {
        let mut params = Vec::new();
        let mut in_param = false;
        let mut param_name = String::new();

        for c in path.chars() {
            match c {
                '{' if !in_param => {
                    in_param = true;
                    param_name.clear();
                }
                '}' if in_param => {
                    params.push(param_name.clone());
                    in_param = false;
                }
                _ if in_param => param_name.push(c),
                _ => {}
            }
        }

        params
    }
}

/// Collapses repeated slashes and drops a trailing one.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::new();
    let mut last_was_slash = false;

    for c in path.chars() {
        if c == '/' {
            if !last_was_slash {
                normalized.push(c);
                last_was_slash = true;
            }
        } else {
            normalized.push(c);
            last_was_slash = false;
        }
    }

    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }

    if normalized.is_empty() {
        "/".to_string()
    } else if !normalized.starts_with('/') {
        format!("/{}", normalized)
    } else {
        normalized
    }
}
