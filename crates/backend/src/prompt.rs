use tfagent_protocol::file_marker;

/// Fixed instructions sent as the system message
pub const SYSTEM_PROMPT: &str = "\
You are an expert Terraform developer specializing in AWS infrastructure. \
Your task is to analyze and modify Terraform code according to the user's requirements.

Follow these guidelines:
1. Carefully analyze all provided Terraform files
2. Understand the infrastructure being deployed
3. Make only the necessary changes to fulfill the user's specific requirements
4. Maintain the existing code structure and style
5. Document your changes with comments
6. Return all modified files with their complete content
7. Format the output as JSON with the file path as key and modified content as value

Before making changes:
- Identify all dependencies between files to ensure your modifications are consistent
- Consider AWS best practices relevant to the user's requirements
- Don't make unrelated changes that weren't requested by the user
- If the user asks for security enhancements, focus on proper security group rules, encryption, IAM policies, etc.
- If the user asks for performance improvements, focus on appropriate instance types, scaling configurations, etc.
- If the user asks for cost optimizations, focus on resource sizing, reserved instances, lifecycle policies, etc.
";

const CLOSING_INSTRUCTIONS: &str = "\
Please analyze these files and make the necessary changes to fulfill the requirements.
Return the modified files in JSON format where each key is the file path and each value is the complete modified content.
Only return the files that you've modified - don't include unchanged files.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Renders one change request against a set of files
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    request: String,
    system: String,
}

impl PromptBuilder {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            system: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Files appear in iteration order, each behind a `--- File: <path> ---` marker
    pub fn render<'a, I>(&self, files: I) -> RenderedPrompt
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut files_content = String::new();
        for (path, content) in files {
            files_content.push_str("\n\n");
            files_content.push_str(&file_marker(path));
            files_content.push_str("\n\n");
            files_content.push_str(content);
        }

        let user = format!(
            "\nUSER REQUIREMENTS:\n{}\n\nTERRAFORM FILES:\n{}\n\n{}",
            self.request, files_content, CLOSING_INSTRUCTIONS
        );

        RenderedPrompt {
            system: self.system.clone(),
            user,
        }
    }
}
