//! Interactive numbered menu over a [`FilterService`]

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{error, info};

use crate::bayes::{Token, TokenProbabilities};
use crate::error::Result;
use crate::service::{FilterService, TestReport};

pub const MENU: &str = "1. Update Tokens\n2. Print Tokens\n3. Test Mail\n4. Set Next Test Index\n0. Quit\n";

/// A menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    UpdateTokens,
    PrintTokens,
    TestMail,
    SetTestIndex,
    Quit,
    Invalid,
}

impl MenuChoice {
    /// Only the first word of the line counts
    pub fn parse(line: &str) -> Self {
        match line.split_whitespace().next().map(str::parse::<i64>) {
            Some(Ok(1)) => MenuChoice::UpdateTokens,
            Some(Ok(2)) => MenuChoice::PrintTokens,
            Some(Ok(3)) => MenuChoice::TestMail,
            Some(Ok(4)) => MenuChoice::SetTestIndex,
            Some(Ok(0)) => MenuChoice::Quit,
            _ => MenuChoice::Invalid,
        }
    }
}

/// Parse a test index from the first word of a line
pub fn parse_index(line: &str) -> Option<usize> {
    line.split_whitespace().next()?.parse().ok()
}

/// Token table with both conditional probabilities
pub fn format_tokens(tokens: &[(Token, TokenProbabilities)]) -> String {
    let mut out = String::from("Printing tokens and conditional probabilities:\n");
    out.push_str(&format!(
        "{:<15.15}   {:<15.15} {:<15.15}\n",
        "Tokens", "Spam", "Not-Spam"
    ));
    for (token, probs) in tokens {
        out.push_str(&format!(
            "{:<15.15} : {:.14} {:.14}\n",
            token, probs.spam, probs.ham
        ));
    }
    out
}

/// Human-readable outcome for one test message
pub fn format_report(report: &TestReport) -> String {
    format!(
        "[log base e of the ratio likelihood of spam/ham for following message: {:8.4}]\n\
         Subject: {}\nFrom: {}\nBody: {}\n\nDetected to be: {}\n\n\n",
        report.classification.log_ratio,
        report.message.subject,
        report.message.from,
        report.message.body,
        report.classification.label()
    )
}

/// Line-oriented menu loop
pub struct Shell<'a, R, W> {
    service: &'a FilterService,
    input: Lines<R>,
    output: W,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(service: &'a FilterService, input: R, output: W) -> Self {
        Self {
            service,
            input: input.lines(),
            output,
        }
    }

    /// Build the initial model, then serve menu selections until `0` or end
    /// of input
    pub async fn run(&mut self) -> Result<()> {
        self.print("Initializing Tokens...\n").await?;
        self.update_tokens().await?;

        loop {
            self.print(MENU).await?;
            let line = match self.input.next_line().await? {
                Some(line) => line,
                None => break,
            };

            match MenuChoice::parse(&line) {
                MenuChoice::UpdateTokens => self.update_tokens().await?,
                MenuChoice::PrintTokens => self.print_tokens().await?,
                MenuChoice::TestMail => self.test_mail().await?,
                MenuChoice::SetTestIndex => self.set_test_index().await?,
                MenuChoice::Quit => {
                    self.print("Quitting.\n").await?;
                    break;
                }
                MenuChoice::Invalid => self.print("Invalid Input.\n").await?,
            }
        }

        self.output.flush().await?;
        info!("Shell closed");
        Ok(())
    }

    async fn update_tokens(&mut self) -> Result<()> {
        match self.service.update_tokens().await {
            Ok(_) => self.print("Tokens updated.\n").await,
            Err(e) => {
                error!("Token update failed: {}", e);
                self.print(&format!("Error updating tokens: {}\n", e)).await
            }
        }
    }

    async fn print_tokens(&mut self) -> Result<()> {
        match self.service.tokens().await {
            Ok(tokens) => self.print(&format_tokens(&tokens)).await,
            Err(e) => self.print(&format!("Error: {}\n", e)).await,
        }
    }

    async fn test_mail(&mut self) -> Result<()> {
        match self.service.test_mail().await {
            Ok(reports) => {
                for report in &reports {
                    self.print(&format_report(report)).await?;
                }
                Ok(())
            }
            Err(e) => {
                error!("Test mail failed: {}", e);
                self.print(&format!("Error testing mail: {}\n", e)).await
            }
        }
    }

    async fn set_test_index(&mut self) -> Result<()> {
        self.print("Enter the number for the next test case:\n").await?;
        if let Some(line) = self.input.next_line().await? {
            if let Some(index) = parse_index(&line) {
                self.service.set_test_offset(index);
            }
        }
        Ok(())
    }

    async fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        Ok(())
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.output
    }
}
