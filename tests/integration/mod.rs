/// Integration tests spanning storage, tools and the MCP server
mod basic_integration;
mod mcp_workflow;
