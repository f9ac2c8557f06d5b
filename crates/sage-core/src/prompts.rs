//! Prompt templates for the four workflows. The model's output markup is
//! transported verbatim by the workflows, so the formatting contract lives
//! entirely in these templates.

/// Shared HTML/markdown formatting contract for answer and summary output.
pub const HTML_FORMATTING_RULES: &str = r#"You MUST strictly follow these formatting rules. No exceptions:
1. Use HTML and markdown formatting correctly:
   - Main topics: <h2> tags
   - Subtopics: <h3> tags
   - Bullet points: <ul> and <li> tags
   - Important terms: <strong> tags
   - Citations: use <sup>[X]</sup> format, where X is the source number.
2. Every factual statement must have a citation. No citation = plagiarism.
3. Break complex explanations into clear, short sections.
4. Keep paragraphs short and easy to read.
5. At the end, include a "References" section:
   - List ALL sources cited.
   - Use numbered format, matching the order of citations in your answer.
6. NEVER invent citations. Only use what is given in the context."#;

#[must_use]
pub fn qa(context: &str, question: &str) -> String {
    format!(
        r#"You are an extremely knowledgeable and precise teaching assistant.
Use the context below from the course materials to answer the student's question.
You may expand on the context if needed to answer the question in more detail.
If any of the context is not relevant to the question, ignore it.

---

# Context:
{context}

---

# Student's Question:
{question}

---

# Formatting Rules:
{HTML_FORMATTING_RULES}

---

# Example Format:
Start explaining the answer to the question here...

<ul>
    <li><strong>First Aspect:</strong> Explanation with citation<sup>[1]</sup></li>
    <li><strong>Second Aspect:</strong> Another explanation<sup>[2,3]</sup></li>
</ul>

<h2>References</h2>
1. From Slide 12 in Example.pptx: "Definition of topic"
2. From Page 45 in Notes.pdf

---

# Now write your answer, carefully following all rules."#
    )
}

#[must_use]
pub fn summarize(context: &str, topic: &str) -> String {
    format!(
        r#"You are an extremely knowledgeable and precise teaching assistant.
Your task is to summarize course materials to help a student understand them better.
Summarize the provided context related to "{topic}".
If any of the context is not relevant to the topic, ignore it.

---

# Context:
{context}

---

# Formatting Rules:
{HTML_FORMATTING_RULES}

---

# Example format:
<h2>Main Topic</h2>
This concept involves several key aspects<sup>[1]</sup>...

<h3>Key Aspects</h3>
<ul>
    <li><strong>First Aspect:</strong> Explanation with citation<sup>[2]</sup></li>
</ul>

<h2>References</h2>
[1] Source 1
[2] Source 2

---

# Now it's time for you to summarize the material."#
    )
}

#[must_use]
pub fn quiz(context: &str, topic: &str, num_questions: usize, previous_questions: &str) -> String {
    format!(
        r#"You are an extremely knowledgeable teaching assistant.
Generate {num_questions} multiple choice questions that test understanding of key concepts about {topic} from the provided context.
If any of the context is not relevant to {topic}, ignore it.

# Context (Course Materials):
{context}

# Previous questions (AVOID REPEATING THESE):
{previous_questions}

---

# Formatting Rules:
1. Each question should have 4 options (A, B, C, D)
2. Only one option should be correct
3. Make questions challenging but fair
4. Include the correct answer after each question marked with 'ANSWER:'
5. Use the same exact format for each question

# Question Format (Follow this Structure):
Question 1: [The question text]
A) [Option A]
B) [Option B]
C) [Option C]
D) [Option D]
ANSWER: [Correct letter]

---

# EXAMPLE QUIZ:

Question 1: What is the capital of France?
A) Berlin
B) Madrid
C) Paris
D) Rome
ANSWER: C
Question 2: Which planet is known as the Red Planet?
A) Earth
B) Mars
C) Jupiter
D) Venus
ANSWER: B

---

# Now it's time for you to generate the quiz."#
    )
}

#[must_use]
pub fn grade(results: &str, topic: &str, student_progress: &str, formatted_quiz: &str) -> String {
    format!(
        r#"You are an extremely knowledgeable teaching assistant providing feedback on a multiple choice quiz about {topic} from course materials.

# Quiz Results:
{results}

# Quiz Questions:
{formatted_quiz}

# Student Progress:
{student_progress}

---

# Please provide detailed feedback following these rules:
1. Use HTML formatting for better readability
2. Explain why each incorrect answer was wrong
3. Provide specific concepts to review for missed questions
4. Give encouraging feedback for correct answers
5. Suggest next steps for learning

Format:

<h2>Quiz Results Analysis</h2>
[Your analysis of overall performance]
<h3>Detailed Feedback</h3>
[Question-by-question feedback]
<h3>Study Recommendations</h3>
[Specific topics to review and resources to check]

---

# Now it's time for you to provide the feedback."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_prompt_carries_context_and_question() {
        let p = qa("CTX-BLOCK", "What is mitosis?");
        assert!(p.contains("CTX-BLOCK"));
        assert!(p.contains("What is mitosis?"));
        assert!(p.contains("<sup>[X]</sup>"));
    }

    #[test]
    fn quiz_prompt_states_count_and_prior_questions() {
        let p = quiz("CTX", "cells", 3, "Question 1: old one");
        assert!(p.contains("Generate 3 multiple choice"));
        assert!(p.contains("old one"));
        assert!(p.contains("ANSWER: [Correct letter]"));
    }

    #[test]
    fn grade_prompt_embeds_results() {
        let p = grade("Q1: \u{2713}", "cells", "attempts: 2", "Question 1: ...");
        assert!(p.contains("Q1: \u{2713}"));
        assert!(p.contains("attempts: 2"));
    }
}
