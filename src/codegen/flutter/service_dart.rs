use std::fmt::Write;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::Entity;
use crate::codegen::utils::escape_dart_string;

use super::ClientConfig;

/// Generate the HTTP access object for an entity
pub fn generate_service_dart(entity: &Entity, config: &ClientConfig) -> Result<String, ArtifactError> {
    let mut out = String::new();
    let name = &entity.name;
    let plural_label = entity.route_segment().replace('-', " ");

    writeln!(out, "import 'dart:convert';")?;
    writeln!(out)?;
    writeln!(out, "import 'package:http/http.dart' as http;")?;
    writeln!(out)?;
    writeln!(out, "import '../models/{}_model.dart';", entity.file_stem())?;
    writeln!(out)?;
    writeln!(out, "class {}Service {{", name)?;
    writeln!(
        out,
        "  static const String baseUrl = '{}';",
        escape_dart_string(&config.endpoint(entity))
    )?;
    writeln!(out, "  static const Map<String, String> _headers = {{")?;
    writeln!(out, "    'Content-Type': 'application/json',")?;
    writeln!(out, "  }};")?;
    writeln!(out)?;
    writeln!(out, "  final http.Client _client;")?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}Service({{http.Client? client}}) : _client = client ?? http.Client();",
        name
    )?;
    writeln!(out)?;

    // getAll
    writeln!(out, "  Future<List<{}>> getAll() async {{", name)?;
    writeln!(out, "    final response = await _client.get(Uri.parse(baseUrl));")?;
    writeln!(out, "    if (response.statusCode == 200) {{")?;
    writeln!(out, "      final List<dynamic> data = jsonDecode(response.body) as List<dynamic>;")?;
    writeln!(
        out,
        "      return data.map((item) => {}.fromJson(item as Map<String, dynamic>)).toList();",
        name
    )?;
    writeln!(out, "    }}")?;
    writeln!(
        out,
        "    throw Exception('Failed to load {}: ${{response.statusCode}}');",
        plural_label
    )?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // getById
    writeln!(out, "  Future<{}?> getById(int id) async {{", name)?;
    writeln!(out, "    final response = await _client.get(Uri.parse('$baseUrl/$id'));")?;
    writeln!(out, "    if (response.statusCode == 200) {{")?;
    writeln!(
        out,
        "      return {}.fromJson(jsonDecode(response.body) as Map<String, dynamic>);",
        name
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "    if (response.statusCode == 404) {{")?;
    writeln!(out, "      return null;")?;
    writeln!(out, "    }}")?;
    writeln!(
        out,
        "    throw Exception('Failed to load {} $id: ${{response.statusCode}}');",
        name
    )?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // create
    writeln!(out, "  Future<{}> create({} item) async {{", name, name)?;
    writeln!(out, "    final response = await _client.post(")?;
    writeln!(out, "      Uri.parse(baseUrl),")?;
    writeln!(out, "      headers: _headers,")?;
    writeln!(out, "      body: jsonEncode(item.toJson()),")?;
    writeln!(out, "    );")?;
    writeln!(out, "    if (response.statusCode == 200 || response.statusCode == 201) {{")?;
    writeln!(
        out,
        "      return {}.fromJson(jsonDecode(response.body) as Map<String, dynamic>);",
        name
    )?;
    writeln!(out, "    }}")?;
    writeln!(
        out,
        "    throw Exception('Failed to create {}: ${{response.statusCode}}');",
        name
    )?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // update
    writeln!(out, "  Future<{}> update(int id, {} item) async {{", name, name)?;
    writeln!(out, "    final response = await _client.put(")?;
    writeln!(out, "      Uri.parse('$baseUrl/$id'),")?;
    writeln!(out, "      headers: _headers,")?;
    writeln!(out, "      body: jsonEncode(item.toJson()),")?;
    writeln!(out, "    );")?;
    writeln!(out, "    if (response.statusCode == 200) {{")?;
    writeln!(
        out,
        "      return {}.fromJson(jsonDecode(response.body) as Map<String, dynamic>);",
        name
    )?;
    writeln!(out, "    }}")?;
    writeln!(
        out,
        "    throw Exception('Failed to update {} $id: ${{response.statusCode}}');",
        name
    )?;
    writeln!(out, "  }}")?;
    writeln!(out)?;

    // delete
    writeln!(out, "  Future<void> delete(int id) async {{")?;
    writeln!(out, "    final response = await _client.delete(Uri.parse('$baseUrl/$id'));")?;
    writeln!(out, "    if (response.statusCode != 200 && response.statusCode != 204) {{")?;
    writeln!(
        out,
        "      throw Exception('Failed to delete {} $id: ${{response.statusCode}}');",
        name
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::NodeKind;

    #[test]
    fn test_service_endpoints() {
        let entity = Entity::new(1, "OrderItem", NodeKind::Standard);
        let dart = generate_service_dart(&entity, &ClientConfig::default()).unwrap();

        assert!(dart.contains("import '../models/order_item_model.dart';"));
        assert!(dart.contains("static const String baseUrl = 'http://10.0.2.2:8080/api/order-items';"));
        assert!(dart.contains("Future<List<OrderItem>> getAll() async {"));
        assert!(dart.contains("Future<OrderItem?> getById(int id) async {"));
        assert!(dart.contains("Uri.parse('$baseUrl/$id')"));
        assert!(dart.contains("throw Exception('Failed to load order items: ${response.statusCode}');"));
        assert!(dart.contains("Future<void> delete(int id) async {"));
    }
}
