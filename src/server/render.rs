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

//! Built-in viewer pages for the render routes.

use crate::spec::ApiFormat;
use std::collections::HashMap;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{title}}</title>
  {{head}}
</head>
<body>
  {{body}}
</body>
</html>
"#;

const OPENAPI_HEAD: &str =
    r#"<link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">"#;
const OPENAPI_BODY: &str = r##"<div id="viewer"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>SwaggerUIBundle({ url: "{{specUrl}}", dom_id: "#viewer" });</script>"##;

const ASYNCAPI_HEAD: &str = r#"<link rel="stylesheet" href="https://unpkg.com/@asyncapi/react-component@1/styles/default.min.css">"#;
const ASYNCAPI_BODY: &str = r#"<div id="viewer"></div>
  <script src="https://unpkg.com/@asyncapi/react-component@1/browser/standalone/index.js"></script>
  <script>AsyncApiStandalone.render({ schema: { url: "{{specUrl}}" } }, document.getElementById("viewer"));</script>"#;

const GRAPHQL_HEAD: &str = r#"<link rel="stylesheet" href="https://unpkg.com/graphiql@3/graphiql.min.css">"#;
const GRAPHQL_BODY: &str = r#"<div id="viewer" style="height: 100vh"></div>
  <script src="https://unpkg.com/react@18/umd/react.production.min.js"></script>
  <script src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"></script>
  <script src="https://unpkg.com/graphiql@3/graphiql.min.js"></script>
  <script>
    fetch("{{specUrl}}").then(r => r.text()).then(sdl => {
      const schema = GraphiQL.buildSchema ? GraphiQL.buildSchema(sdl) : undefined;
      ReactDOM.createRoot(document.getElementById("viewer")).render(
        React.createElement(GraphiQL, { fetcher: GraphiQL.createFetcher({ url: "{{mockUrl}}" }), schema })
      );
    });
  </script>"#;

/// Replaces every `{{key}}` in `template`.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    rendered
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Viewer page for `format`, or `None` when the format has no viewer.
///
/// `spec_url` is the raw spec route; `mock_url` the mock execution route.
pub fn viewer_page(format: ApiFormat, title: &str, spec_url: &str, mock_url: &str) -> Option<String> {
    let (head, body) = match format {
        ApiFormat::OpenApi => (OPENAPI_HEAD, OPENAPI_BODY),
        ApiFormat::AsyncApi => (ASYNCAPI_HEAD, ASYNCAPI_BODY),
        ApiFormat::GraphQl => (GRAPHQL_HEAD, GRAPHQL_BODY),
        _ => return None,
    };

    let mut values = HashMap::new();
    values.insert("title", escape(title));
    values.insert("head", head.to_string());
    let page = render_template(PAGE, &values);

    values.clear();
    values.insert("body", body.to_string());
    let page = render_template(&page, &values);

    values.clear();
    values.insert("specUrl", escape(spec_url));
    values.insert("mockUrl", escape(mock_url));
    Some(render_template(&page, &values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let mut values = HashMap::new();
        values.insert("name", "Rex".to_string());
        assert_eq!(render_template("Hello {{name}}, {{name}}!", &values), "Hello Rex, Rex!");
        assert_eq!(render_template("{{other}}", &values), "{{other}}");
    }

    #[test]
    fn test_openapi_page_points_at_spec() {
        let page = viewer_page(
            ApiFormat::OpenApi,
            "projects/p/locations/l/apis/a/versions/v/specs/s",
            "/spec/openapi/projects/p/locations/l/apis/a/versions/v/specs/s?endpoint_uri=http%3A%2F%2Fx",
            "/projects/p/locations/l/apis/a/versions/v/specs/s",
        )
        .unwrap();

        assert!(page.contains("SwaggerUIBundle"));
        assert!(page.contains(r##"dom_id: "#viewer""##));
        assert!(page.contains(
            r#"url: "/spec/openapi/projects/p/locations/l/apis/a/versions/v/specs/s?endpoint_uri=http%3A%2F%2Fx""#
        ));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_graphql_page_uses_mock_url() {
        let page = viewer_page(ApiFormat::GraphQl, "t", "/spec/graphql/x", "/projects/x").unwrap();
        assert!(page.contains(r#"url: "/projects/x""#));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = viewer_page(ApiFormat::AsyncApi, "<script>", "/s", "/m").unwrap();
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_formats_without_viewer() {
        assert!(viewer_page(ApiFormat::Grpc, "t", "/s", "/m").is_none());
        assert!(viewer_page(ApiFormat::Unknown, "t", "/s", "/m").is_none());
    }
}
