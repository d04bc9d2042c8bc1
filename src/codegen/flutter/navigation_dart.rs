use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::Entity;
use crate::codegen::utils::{escape_dart_string, pluralize, to_title_case};

use super::ClientConfig;

/// Generate `lib/routes/app_routes.dart`: one named route per entity page
pub fn generate_app_routes_dart(entities: &[&Entity]) -> Result<String, ArtifactError> {
    let mut out = String::new();

    writeln!(out, "import 'package:flutter/material.dart';")?;
    writeln!(out)?;
    writeln!(out, "import 'home_menu.dart';")?;
    for entity in entities {
        writeln!(out, "import '../pages/{}_page.dart';", entity.file_stem())?;
    }
    writeln!(out)?;

    writeln!(out, "class AppRoutes {{")?;
    writeln!(out, "  static const String home = '/';")?;
    for entity in entities {
        writeln!(
            out,
            "  static const String {} = '/{}';",
            entity.plural_var_name(),
            entity.route_segment()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  static Map<String, WidgetBuilder> get routes => {{")?;
    writeln!(out, "        home: (context) => const LandingMenu(),")?;
    for entity in entities {
        writeln!(
            out,
            "        {}: (context) => const {}Page(),",
            entity.plural_var_name(),
            entity.name
        )?;
    }
    writeln!(out, "      }};")?;
    writeln!(out, "}}")?;

    Ok(out)
}

/// Generate `lib/routes/home_menu.dart`: the landing menu.
///
/// It lives beside the route table and is named `LandingMenu` so no entity page
/// (`lib/pages/<stem>_page.dart`, class `<Entity>Page`) can collide with it.
pub fn generate_home_menu_dart(
    entities: &[&Entity],
    config: &ClientConfig,
) -> Result<String, ArtifactError> {
    let mut out = String::new();

    writeln!(out, "import 'package:flutter/material.dart';")?;
    writeln!(out)?;
    writeln!(out, "import 'app_routes.dart';")?;
    writeln!(out)?;
    writeln!(out, "class LandingMenu extends StatelessWidget {{")?;
    writeln!(out, "  const LandingMenu({{super.key}});")?;
    writeln!(out)?;
    writeln!(out, "  static const List<_MenuEntry> _entries = [")?;
    for entity in entities {
        writeln!(
            out,
            "    _MenuEntry('{}', AppRoutes.{}),",
            escape_dart_string(&to_title_case(&pluralize(&entity.name))),
            entity.plural_var_name()
        )?;
    }
    writeln!(out, "  ];")?;
    writeln!(out)?;
    writeln!(out, "  @override")?;
    writeln!(out, "  Widget build(BuildContext context) {{")?;
    writeln!(out, "    return Scaffold(")?;
    writeln!(
        out,
        "      appBar: AppBar(title: const Text('{}')),",
        escape_dart_string(&config.app_title)
    )?;
    writeln!(out, "      body: ListView(")?;
    writeln!(out, "        children: [")?;
    writeln!(out, "          for (final entry in _entries)")?;
    writeln!(out, "            ListTile(")?;
    writeln!(out, "              leading: const Icon(Icons.folder_open),")?;
    writeln!(out, "              title: Text(entry.title),")?;
    writeln!(out, "              trailing: const Icon(Icons.chevron_right),")?;
    writeln!(out, "              onTap: () => Navigator.pushNamed(context, entry.route),")?;
    writeln!(out, "            ),")?;
    writeln!(out, "        ],")?;
    writeln!(out, "      ),")?;
    writeln!(out, "    );")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "class _MenuEntry {{")?;
    writeln!(out, "  final String title;")?;
    writeln!(out, "  final String route;")?;
    writeln!(out)?;
    writeln!(out, "  const _MenuEntry(this.title, this.route);")?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::NodeKind;

    #[test]
    fn test_routes_follow_entity_order() {
        let customer = Entity::new(1, "Customer", NodeKind::Standard);
        let item = Entity::new(2, "OrderItem", NodeKind::Standard);
        let dart = generate_app_routes_dart(&[&customer, &item]).unwrap();

        assert!(dart.contains("static const String customers = '/customers';"));
        assert!(dart.contains("static const String orderItems = '/order-items';"));
        assert!(dart.contains("orderItems: (context) => const OrderItemPage(),"));
        let customer_pos = dart.find("import '../pages/customer_page.dart';").unwrap();
        let item_pos = dart.find("import '../pages/order_item_page.dart';").unwrap();
        assert!(customer_pos < item_pos);
    }

    #[test]
    fn test_home_entity_page_is_distinct_from_menu() {
        let home = Entity::new(1, "Home", NodeKind::Standard);
        let dart = generate_app_routes_dart(&[&home]).unwrap();

        assert!(dart.contains("import '../pages/home_page.dart';"));
        assert!(dart.contains("homes: (context) => const HomePage(),"));
        assert!(dart.contains("home: (context) => const LandingMenu(),"));
    }

    #[test]
    fn test_home_menu() {
        let child = Entity::new(1, "Child", NodeKind::Standard);
        let config = ClientConfig {
            app_title: "Kids' Club".to_string(),
            ..Default::default()
        };
        let dart = generate_home_menu_dart(&[&child], &config).unwrap();

        assert!(dart.contains("_MenuEntry('Children', AppRoutes.children),"));
        assert!(dart.contains("AppBar(title: const Text('Kids\\' Club'))"));
    }

    #[test]
    fn test_empty_navigation_still_has_home() {
        let dart = generate_app_routes_dart(&[]).unwrap();
        assert!(dart.contains("home: (context) => const LandingMenu(),"));
    }
}
