/// App entry point and package manifest for a standalone client tree.

use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::utils::{escape_dart_string, to_snake_case};

use super::ClientConfig;

/// Generate `lib/main.dart`
pub fn generate_main_dart(config: &ClientConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();

    writeln!(out, "import 'package:flutter/material.dart';")?;
    writeln!(out)?;
    writeln!(out, "import 'routes/app_routes.dart';")?;
    writeln!(out)?;
    writeln!(out, "void main() {{")?;
    writeln!(out, "  runApp(const GeneratedApp());")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "class GeneratedApp extends StatelessWidget {{")?;
    writeln!(out, "  const GeneratedApp({{super.key}});")?;
    writeln!(out)?;
    writeln!(out, "  @override")?;
    writeln!(out, "  Widget build(BuildContext context) {{")?;
    writeln!(out, "    return MaterialApp(")?;
    writeln!(out, "      title: '{}',", escape_dart_string(&config.app_title))?;
    writeln!(out, "      debugShowCheckedModeBanner: false,")?;
    writeln!(out, "      theme: ThemeData(colorSchemeSeed: Colors.indigo, useMaterial3: true),")?;
    writeln!(out, "      initialRoute: AppRoutes.home,")?;
    writeln!(out, "      routes: AppRoutes.routes,")?;
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

/// Generate `pubspec.yaml`
pub fn generate_pubspec_yaml(config: &ClientConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let package = to_snake_case(&config.package_name);

    writeln!(out, "name: {}", package)?;
    writeln!(
        out,
        "description: {}",
        serde_json::to_string(&config.app_title).map_err(|e| ArtifactError::Template(e.to_string()))?
    )?;
    writeln!(out, "publish_to: 'none'")?;
    writeln!(out, "version: 1.0.0+1")?;
    writeln!(out)?;
    writeln!(out, "environment:")?;
    writeln!(out, "  sdk: '>=3.0.0 <4.0.0'")?;
    writeln!(out)?;
    writeln!(out, "dependencies:")?;
    writeln!(out, "  flutter:")?;
    writeln!(out, "    sdk: flutter")?;
    writeln!(out, "  http: ^1.2.0")?;
    writeln!(out, "  cupertino_icons: ^1.0.6")?;
    writeln!(out)?;
    writeln!(out, "dev_dependencies:")?;
    writeln!(out, "  flutter_test:")?;
    writeln!(out, "    sdk: flutter")?;
    writeln!(out, "  flutter_lints: ^3.0.0")?;
    writeln!(out)?;
    writeln!(out, "flutter:")?;
    writeln!(out, "  uses-material-design: true")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_dart() {
        let config = ClientConfig {
            app_title: "Shop".to_string(),
            ..Default::default()
        };
        let dart = generate_main_dart(&config).unwrap();
        assert!(dart.contains("title: 'Shop',"));
        assert!(dart.contains("routes: AppRoutes.routes,"));
    }

    #[test]
    fn test_pubspec_is_valid_yaml() {
        let config = ClientConfig {
            app_title: "Shop: admin".to_string(),
            package_name: "ShopClient".to_string(),
            ..Default::default()
        };
        let yaml = generate_pubspec_yaml(&config).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["name"].as_str(), Some("shop_client"));
        assert_eq!(parsed["description"].as_str(), Some("Shop: admin"));
        assert_eq!(parsed["dependencies"]["http"].as_str(), Some("^1.2.0"));
    }
}
